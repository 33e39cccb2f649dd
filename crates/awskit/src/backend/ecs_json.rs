//! Wire-shaped JSON for ECS task definitions.
//!
//! The SDK types do not implement `Serialize`, so each field is written out
//! under its service (camelCase) name. Absent members are dropped, matching
//! what `DescribeTaskDefinition` itself returns.

use aws_sdk_ecs::primitives::{DateTime, DateTimeFormat};
use aws_sdk_ecs::types::{
    Attribute, ContainerDefinition, ContainerDependency, ContainerRestartPolicy, Device,
    DockerVolumeConfiguration, EfsAuthorizationConfig, EfsVolumeConfiguration, EnvironmentFile,
    EphemeralStorage, FirelensConfiguration, FSxWindowsFileServerAuthorizationConfig,
    FSxWindowsFileServerVolumeConfiguration, HealthCheck, HostEntry, HostVolumeProperties,
    InferenceAccelerator, KernelCapabilities, KeyValuePair, LinuxParameters, LogConfiguration,
    MountPoint, PortMapping, ProxyConfiguration, RepositoryCredentials, ResourceRequirement,
    RuntimePlatform, Secret, SystemControl, TaskDefinition, TaskDefinitionPlacementConstraint,
    Tmpfs, Ulimit, Volume, VolumeFrom,
};
use serde_json::{Map, Value, json};

/// A member the SDK exposes either as `Option<&T>` or, when required, `&T`.
trait Member<'a, T> {
    fn member(self) -> Option<&'a T>;
}

impl<'a, T> Member<'a, T> for &'a T {
    fn member(self) -> Option<&'a T> {
        Some(self)
    }
}

impl<'a, T> Member<'a, T> for Option<&'a T> {
    fn member(self) -> Option<&'a T> {
        self
    }
}

/// Drop null members.
fn object(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

/// An SDK enum as its wire string.
fn wire<'a, E: AsRef<str> + 'a>(value: impl Member<'a, E>) -> Value {
    value
        .member()
        .map_or(Value::Null, |e| Value::String(e.as_ref().to_string()))
}

fn wire_list<E: AsRef<str>>(values: &[E]) -> Value {
    Value::Array(
        values
            .iter()
            .map(|e| Value::String(e.as_ref().to_string()))
            .collect(),
    )
}

fn nested<'a, T: 'a>(value: impl Member<'a, T>, to_json: fn(&T) -> Value) -> Value {
    value.member().map_or(Value::Null, to_json)
}

fn list<T>(values: &[T], to_json: fn(&T) -> Value) -> Value {
    Value::Array(values.iter().map(to_json).collect())
}

fn timestamp<'a>(value: impl Member<'a, DateTime>) -> Value {
    value
        .member()
        .and_then(|t| t.fmt(DateTimeFormat::DateTime).ok())
        .map_or(Value::Null, Value::String)
}

// ============================================================================
// Task definition
// ============================================================================

/// Full `DescribeTaskDefinition` record.
pub(crate) fn task_definition_json(td: &TaskDefinition) -> Value {
    object(json!({
        "taskDefinitionArn": td.task_definition_arn(),
        "containerDefinitions": list(td.container_definitions(), container_definition_json),
        "family": td.family(),
        "taskRoleArn": td.task_role_arn(),
        "executionRoleArn": td.execution_role_arn(),
        "networkMode": wire(td.network_mode()),
        "revision": td.revision(),
        "volumes": list(td.volumes(), volume_json),
        "status": wire(td.status()),
        "requiresAttributes": list(td.requires_attributes(), attribute_json),
        "placementConstraints": list(td.placement_constraints(), placement_constraint_json),
        "compatibilities": wire_list(td.compatibilities()),
        "runtimePlatform": nested(td.runtime_platform(), runtime_platform_json),
        "requiresCompatibilities": wire_list(td.requires_compatibilities()),
        "cpu": td.cpu(),
        "memory": td.memory(),
        "inferenceAccelerators": list(td.inference_accelerators(), inference_accelerator_json),
        "pidMode": wire(td.pid_mode()),
        "ipcMode": wire(td.ipc_mode()),
        "proxyConfiguration": nested(td.proxy_configuration(), proxy_configuration_json),
        "registeredAt": timestamp(td.registered_at()),
        "deregisteredAt": timestamp(td.deregistered_at()),
        "registeredBy": td.registered_by(),
        "ephemeralStorage": nested(td.ephemeral_storage(), ephemeral_storage_json),
        "enableFaultInjection": td.enable_fault_injection(),
    }))
}

fn attribute_json(a: &Attribute) -> Value {
    object(json!({
        "name": a.name(),
        "value": a.value(),
        "targetType": wire(a.target_type()),
        "targetId": a.target_id(),
    }))
}

fn placement_constraint_json(c: &TaskDefinitionPlacementConstraint) -> Value {
    object(json!({
        "type": wire(c.r#type()),
        "expression": c.expression(),
    }))
}

fn runtime_platform_json(p: &RuntimePlatform) -> Value {
    object(json!({
        "cpuArchitecture": wire(p.cpu_architecture()),
        "operatingSystemFamily": wire(p.operating_system_family()),
    }))
}

fn inference_accelerator_json(a: &InferenceAccelerator) -> Value {
    object(json!({
        "deviceName": a.device_name(),
        "deviceType": a.device_type(),
    }))
}

fn proxy_configuration_json(p: &ProxyConfiguration) -> Value {
    object(json!({
        "type": wire(p.r#type()),
        "containerName": p.container_name(),
        "properties": list(p.properties(), key_value_json),
    }))
}

fn ephemeral_storage_json(s: &EphemeralStorage) -> Value {
    json!({ "sizeInGiB": s.size_in_gib() })
}

fn key_value_json(kv: &KeyValuePair) -> Value {
    object(json!({ "name": kv.name(), "value": kv.value() }))
}

// ============================================================================
// Volumes
// ============================================================================

fn volume_json(v: &Volume) -> Value {
    object(json!({
        "name": v.name(),
        "host": nested(v.host(), host_json),
        "dockerVolumeConfiguration": nested(v.docker_volume_configuration(), docker_volume_json),
        "efsVolumeConfiguration": nested(v.efs_volume_configuration(), efs_volume_json),
        "fsxWindowsFileServerVolumeConfiguration": nested(
            v.fsx_windows_file_server_volume_configuration(),
            fsx_volume_json
        ),
        "configuredAtLaunch": v.configured_at_launch(),
    }))
}

fn host_json(h: &HostVolumeProperties) -> Value {
    object(json!({ "sourcePath": h.source_path() }))
}

fn docker_volume_json(d: &DockerVolumeConfiguration) -> Value {
    object(json!({
        "scope": wire(d.scope()),
        "autoprovision": d.autoprovision(),
        "driver": d.driver(),
        "driverOpts": d.driver_opts(),
        "labels": d.labels(),
    }))
}

fn efs_volume_json(e: &EfsVolumeConfiguration) -> Value {
    object(json!({
        "fileSystemId": e.file_system_id(),
        "rootDirectory": e.root_directory(),
        "transitEncryption": wire(e.transit_encryption()),
        "transitEncryptionPort": e.transit_encryption_port(),
        "authorizationConfig": nested(e.authorization_config(), efs_authorization_json),
    }))
}

fn efs_authorization_json(a: &EfsAuthorizationConfig) -> Value {
    object(json!({
        "accessPointId": a.access_point_id(),
        "iam": wire(a.iam()),
    }))
}

fn fsx_volume_json(f: &FSxWindowsFileServerVolumeConfiguration) -> Value {
    object(json!({
        "fileSystemId": f.file_system_id(),
        "rootDirectory": f.root_directory(),
        "authorizationConfig": nested(f.authorization_config(), fsx_authorization_json),
    }))
}

fn fsx_authorization_json(a: &FSxWindowsFileServerAuthorizationConfig) -> Value {
    object(json!({
        "credentialsParameter": a.credentials_parameter(),
        "domain": a.domain(),
    }))
}

// ============================================================================
// Containers
// ============================================================================

fn container_definition_json(c: &ContainerDefinition) -> Value {
    object(json!({
        "name": c.name(),
        "image": c.image(),
        "repositoryCredentials": nested(c.repository_credentials(), repository_credentials_json),
        "cpu": c.cpu(),
        "memory": c.memory(),
        "memoryReservation": c.memory_reservation(),
        "links": c.links(),
        "portMappings": list(c.port_mappings(), port_mapping_json),
        "essential": c.essential(),
        "restartPolicy": nested(c.restart_policy(), restart_policy_json),
        "entryPoint": c.entry_point(),
        "command": c.command(),
        "environment": list(c.environment(), key_value_json),
        "environmentFiles": list(c.environment_files(), environment_file_json),
        "mountPoints": list(c.mount_points(), mount_point_json),
        "volumesFrom": list(c.volumes_from(), volume_from_json),
        "linuxParameters": nested(c.linux_parameters(), linux_parameters_json),
        "secrets": list(c.secrets(), secret_json),
        "dependsOn": list(c.depends_on(), dependency_json),
        "startTimeout": c.start_timeout(),
        "stopTimeout": c.stop_timeout(),
        "versionConsistency": wire(c.version_consistency()),
        "hostname": c.hostname(),
        "user": c.user(),
        "workingDirectory": c.working_directory(),
        "disableNetworking": c.disable_networking(),
        "privileged": c.privileged(),
        "readonlyRootFilesystem": c.readonly_root_filesystem(),
        "dnsServers": c.dns_servers(),
        "dnsSearchDomains": c.dns_search_domains(),
        "extraHosts": list(c.extra_hosts(), host_entry_json),
        "dockerSecurityOptions": c.docker_security_options(),
        "interactive": c.interactive(),
        "pseudoTerminal": c.pseudo_terminal(),
        "dockerLabels": c.docker_labels(),
        "ulimits": list(c.ulimits(), ulimit_json),
        "logConfiguration": nested(c.log_configuration(), log_configuration_json),
        "healthCheck": nested(c.health_check(), health_check_json),
        "systemControls": list(c.system_controls(), system_control_json),
        "resourceRequirements": list(c.resource_requirements(), resource_requirement_json),
        "firelensConfiguration": nested(c.firelens_configuration(), firelens_json),
        "credentialSpecs": c.credential_specs(),
    }))
}

fn repository_credentials_json(r: &RepositoryCredentials) -> Value {
    json!({ "credentialsParameter": r.credentials_parameter() })
}

fn port_mapping_json(p: &PortMapping) -> Value {
    object(json!({
        "containerPort": p.container_port(),
        "hostPort": p.host_port(),
        "protocol": wire(p.protocol()),
        "name": p.name(),
        "appProtocol": wire(p.app_protocol()),
        "containerPortRange": p.container_port_range(),
    }))
}

fn restart_policy_json(r: &ContainerRestartPolicy) -> Value {
    object(json!({
        "enabled": r.enabled(),
        "ignoredExitCodes": r.ignored_exit_codes(),
        "restartAttemptPeriod": r.restart_attempt_period(),
    }))
}

fn environment_file_json(f: &EnvironmentFile) -> Value {
    object(json!({ "value": f.value(), "type": wire(f.r#type()) }))
}

fn mount_point_json(m: &MountPoint) -> Value {
    object(json!({
        "sourceVolume": m.source_volume(),
        "containerPath": m.container_path(),
        "readOnly": m.read_only(),
    }))
}

fn volume_from_json(v: &VolumeFrom) -> Value {
    object(json!({
        "sourceContainer": v.source_container(),
        "readOnly": v.read_only(),
    }))
}

fn linux_parameters_json(l: &LinuxParameters) -> Value {
    object(json!({
        "capabilities": nested(l.capabilities(), capabilities_json),
        "devices": list(l.devices(), device_json),
        "initProcessEnabled": l.init_process_enabled(),
        "sharedMemorySize": l.shared_memory_size(),
        "tmpfs": list(l.tmpfs(), tmpfs_json),
        "maxSwap": l.max_swap(),
        "swappiness": l.swappiness(),
    }))
}

fn capabilities_json(k: &KernelCapabilities) -> Value {
    json!({ "add": k.add(), "drop": k.drop() })
}

fn device_json(d: &Device) -> Value {
    object(json!({
        "hostPath": d.host_path(),
        "containerPath": d.container_path(),
        "permissions": wire_list(d.permissions()),
    }))
}

fn tmpfs_json(t: &Tmpfs) -> Value {
    object(json!({
        "containerPath": t.container_path(),
        "size": t.size(),
        "mountOptions": t.mount_options(),
    }))
}

fn secret_json(s: &Secret) -> Value {
    object(json!({ "name": s.name(), "valueFrom": s.value_from() }))
}

fn dependency_json(d: &ContainerDependency) -> Value {
    object(json!({
        "containerName": d.container_name(),
        "condition": wire(d.condition()),
    }))
}

fn host_entry_json(h: &HostEntry) -> Value {
    object(json!({ "hostname": h.hostname(), "ipAddress": h.ip_address() }))
}

fn ulimit_json(u: &Ulimit) -> Value {
    object(json!({
        "name": wire(u.name()),
        "softLimit": u.soft_limit(),
        "hardLimit": u.hard_limit(),
    }))
}

fn log_configuration_json(l: &LogConfiguration) -> Value {
    object(json!({
        "logDriver": wire(l.log_driver()),
        "options": l.options(),
        "secretOptions": list(l.secret_options(), secret_json),
    }))
}

fn health_check_json(h: &HealthCheck) -> Value {
    object(json!({
        "command": h.command(),
        "interval": h.interval(),
        "timeout": h.timeout(),
        "retries": h.retries(),
        "startPeriod": h.start_period(),
    }))
}

fn system_control_json(s: &SystemControl) -> Value {
    object(json!({ "namespace": s.namespace(), "value": s.value() }))
}

fn resource_requirement_json(r: &ResourceRequirement) -> Value {
    object(json!({ "value": r.value(), "type": wire(r.r#type()) }))
}

fn firelens_json(f: &FirelensConfiguration) -> Value {
    object(json!({
        "type": wire(f.r#type()),
        "options": f.options(),
    }))
}
