use colored::Colorize;

use super::{Notice, NoticeQueue};

pub fn render_notice(notice: &Notice) -> String {
    let mut out = if notice.is_success() {
        format!(
            "{} {}\n  {}",
            "✓".bright_green(),
            notice.title.bright_green().bold(),
            notice.description.bright_white()
        )
    } else {
        format!(
            "{} {}\n  {}",
            "✗".bright_red(),
            notice.title.bright_red().bold(),
            notice.description.bright_white()
        )
    };
    for detail in &notice.details {
        out.push_str(&format!("\n  - {}", detail.bright_red()));
    }
    out
}

pub fn print_notices(queue: &mut NoticeQueue) {
    for notice in queue.drain() {
        println!();
        println!("{}", render_notice(&notice));
    }
}
