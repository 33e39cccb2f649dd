//! Plan display - awsmod-specific UI

use colored::Colorize;
use declarative::{Action, Plan};

/// Render a plan as a boxed list of changes
pub fn render_plan(plan: &Plan, check: bool) -> String {
    let mut out = String::new();

    if plan.is_empty() {
        out.push_str(&format!("  {} No changes needed\n", "✓".green()));
        return out;
    }

    out.push_str(&format!(
        "┌─ {} ─────────────────────────────────────────┐\n",
        "IAM User Plan".bold()
    ));
    out.push_str("│\n");

    for action in &plan.actions {
        let symbol = if action.is_removal() {
            "-".red()
        } else {
            "+".green()
        };
        out.push_str(&format!(
            "│   {} {:<45} {}\n",
            symbol,
            action.to_string(),
            action.id().dimmed()
        ));
    }
    out.push_str("│\n");

    let removals = plan.actions.iter().filter(|a| a.is_removal()).count();
    let additions = plan.len() - removals;

    out.push_str("├─────────────────────────────────────────────────────┤\n");
    out.push_str(&format!(
        "│ Summary: {} changes ({} additions, {} removals)\n",
        plan.len().to_string().bold(),
        additions.to_string().green(),
        removals.to_string().red()
    ));
    if check {
        out.push_str(&format!(
            "│ {} Check mode - no changes made\n",
            "ℹ".blue()
        ));
    }
    out.push_str("└─────────────────────────────────────────────────────┘\n");
    out
}

/// Display a plan on stderr
pub fn display_plan(plan: &Plan, check: bool) {
    eprintln!();
    eprint!("{}", render_plan(plan, check));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> Plan {
        Plan {
            actions: vec![
                Action::DetachPolicy {
                    user: "joe".into(),
                    policy_arn: "arn:aws:iam::aws:policy/ReadOnlyAccess".into(),
                },
                Action::AttachPolicy {
                    user: "joe".into(),
                    policy_arn: "arn:aws:iam::aws:policy/AmazonS3FullAccess".into(),
                },
                Action::AddToInstanceProfile {
                    profile: "joe".into(),
                    user: "joe".into(),
                },
            ],
        }
    }

    #[test]
    fn test_render_empty_plan() {
        colored::control::set_override(false);
        assert!(render_plan(&Plan::new(), false).contains("No changes needed"));
    }

    #[test]
    fn test_render_plan_lines_and_summary() {
        colored::control::set_override(false);
        let out = render_plan(&plan(), false);

        assert!(out.contains("- detach arn:aws:iam::aws:policy/ReadOnlyAccess from joe"));
        assert!(out.contains("+ attach arn:aws:iam::aws:policy/AmazonS3FullAccess to joe"));
        assert!(out.contains("+ add joe to instance profile joe"));
        assert!(out.contains("Summary: 3 changes (2 additions, 1 removals)"));
        assert!(!out.contains("Check mode"));
    }

    #[test]
    fn test_render_check_mode_note() {
        colored::control::set_override(false);
        assert!(render_plan(&plan(), true).contains("Check mode - no changes made"));
    }
}
