//! Terminal rendering of previews, reports and summaries.
//!
//! The tree layout itself is computed uncolored (and tested that way);
//! the `print_*` helpers add color when writing to the terminal.

use colored::Colorize;

use crate::execution::RunSummary;
use crate::tree::TreeNode;
use crate::validate::ValidationIssue;

struct TreeLine {
    prefix: String,
    name: String,
    is_directory: bool,
}

fn tree_lines(root: &TreeNode) -> Vec<TreeLine> {
    let mut lines = vec![TreeLine {
        prefix: String::new(),
        name: format!("{}/", root.name()),
        is_directory: true,
    }];
    collect_lines(root.children(), "", &mut lines);
    lines
}

fn collect_lines(children: &[TreeNode], indent: &str, out: &mut Vec<TreeLine>) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let connector = if last { "└── " } else { "├── " };

        let name = if child.is_directory() {
            format!("{}/", child.name())
        } else {
            child.name().to_string()
        };
        out.push(TreeLine {
            prefix: format!("{}{}", indent, connector),
            name,
            is_directory: child.is_directory(),
        });

        if child.is_directory() {
            let deeper = format!("{}{}", indent, if last { "    " } else { "│   " });
            collect_lines(child.children(), &deeper, out);
        }
    }
}

/// Uncolored rendering of a tree, one node per line.
pub fn format_tree(root: &TreeNode) -> String {
    tree_lines(root)
        .into_iter()
        .map(|line| format!("{}{}", line.prefix, line.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print a tree with directories and files colorized.
pub fn print_tree(root: &TreeNode) {
    for line in tree_lines(root) {
        if line.is_directory {
            println!("{}{}", line.prefix, line.name.cyan().bold());
        } else {
            println!("{}{}", line.prefix, line.name.green());
        }
    }
}

/// Print a validation report verbatim, one issue per line.
pub fn print_issues(issues: &[ValidationIssue]) {
    eprintln!(
        "{}",
        format!("Mapping validation failed with {} issue(s):", issues.len())
            .red()
            .bold()
    );
    for issue in issues {
        eprintln!("  {} {}", "✗".red(), issue);
    }
}

/// Print the end-of-run summary.
pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", "Summary".bold());
    println!("  files moved:   {}", summary.moved.to_string().green());
    println!("  files skipped: {}", summary.skipped.to_string().yellow());
    for skip in &summary.skips {
        println!(
            "    {} {} -> {}: {}",
            "·".yellow(),
            skip.source,
            skip.dest,
            skip.reason
        );
    }
    if let Some(cleanup) = summary.cleanup {
        println!("  empty directories removed: {}", cleanup.removed);
    }
}
