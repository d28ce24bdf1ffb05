// src/ui.rs

use crate::{
    constants,
    models::{Provenance, ResolutionOutcome},
    symbols,
};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    io::{self, Write},
    time::Duration,
};

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(" {}", title.cyan().bold());
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_sub_header(title: &str) {
    println!("\n--- {} ---", title.bold());
}

pub fn box_message(title: &str, content: &[&str], color_func: fn(ColoredString) -> ColoredString) {
    println!("\n┌{}┐", "─".repeat(constants::UI_WIDTH - 2));
    println!("  {}", color_func(title.bold()));
    println!("├{}┤", "─".repeat(constants::UI_WIDTH - 2));
    for line in content {
        println!("  {}", line);
    }
    println!("└{}┘", "─".repeat(constants::UI_WIDTH - 2));
}

pub fn prompt(message: &str, default: Option<&str>) -> io::Result<String> {
    let default_str = default.map_or("".to_string(), |d| format!(" (默认: {})", d));
    print!("\n>>> {}{}: ", message, default_str);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "输入已结束"));
    }
    let input = input.trim().to_string();
    if input.is_empty() {
        Ok(default.unwrap_or("").to_string())
    } else {
        Ok(input)
    }
}

/// 解析过程中显示的等待动画
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn truncate_text(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

pub fn print_outcome(outcome: &ResolutionOutcome) {
    let provenance = match outcome.provenance {
        Provenance::Backend => &*symbols::BACKEND,
        Provenance::Synthetic => &*symbols::SYNTHETIC,
    };
    let mut lines = vec![
        format!("视频 ID : {}", outcome.video_id),
        format!("格式    : {} (代码 {})", outcome.format.label, outcome.format.code),
        format!("来源    : {}{}", provenance, outcome.backend.as_deref().map(|b| format!(" ({})", b)).unwrap_or_default()),
    ];
    if let Some(title) = &outcome.title {
        lines.push(format!("标题    : {}", title));
    }
    if let Some(author) = &outcome.author {
        lines.push(format!("作者    : {}", author));
    }
    lines.push(format!("解析时间: {}", outcome.resolved_at.format("%Y-%m-%d %H:%M:%S UTC")));
    let content: Vec<&str> = lines.iter().map(String::as_str).collect();
    box_message("解析结果", &content, |s| s.cyan());

    println!("\n{} 主链接:\n    {}", *symbols::OK, outcome.primary_link);
    if !outcome.alternative_links.is_empty() {
        println!("{} 备选链接 ({} 个):", *symbols::INFO, outcome.alternative_links.len());
        for (i, link) in outcome.alternative_links.iter().enumerate() {
            println!("    [{}] {}", i + 1, truncate_text(link, constants::LINK_TRUNCATE_LENGTH));
        }
    }
    if outcome.provenance == Provenance::Synthetic {
        println!(
            "\n{} {}",
            *symbols::WARN,
            "所有解析后端均不可用，以上为按规则生成的链接，未经验证，可能无法播放。".yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_text("abc", 10), "abc");
        assert_eq!(truncate_text("abcdefghijkl", 8), "abcde...");
    }
}
