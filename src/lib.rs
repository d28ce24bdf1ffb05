// src/lib.rs

pub mod backend;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod format;
pub mod models;
pub mod orchestrator;
pub mod service;
pub mod symbols;
pub mod synthetic;
pub mod ui;

use crate::{
    cli::Cli,
    client::RobustClient,
    config::AppConfig,
    error::{AppError, AppResult},
    models::{ResolutionOutcome, ResolveResponse},
    service::ResolutionService,
};
use anyhow::anyhow;
use colored::*;
use log::{debug, error, info, warn};
use std::{path::Path, sync::Arc};
use tokio_util::sync::CancellationToken;

/// 核心的执行上下文，包含所有任务所需的状态和工具
#[derive(Clone)]
pub struct ResolveJobContext {
    pub config: Arc<AppConfig>,
    pub service: Arc<ResolutionService>,
    pub args: Arc<Cli>,
    pub cancellation_token: CancellationToken,
}

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>, cancellation_token: CancellationToken) -> AppResult<()> {
    debug!("CLI 参数: {:?}", args);

    let config = Arc::new(AppConfig::new(&args)?);
    debug!("加载的应用配置: {:?}", config);

    let http_client = Arc::new(RobustClient::new(&config)?);
    let service = Arc::new(ResolutionService::new(&config, http_client));
    info!("后端优先级: {:?}", service.backend_names());

    let context = ResolveJobContext {
        config,
        service,
        args: args.clone(),
        cancellation_token,
    };

    if args.interactive {
        handle_interactive_mode(context).await?;
    } else if let Some(batch_file) = &args.batch_file {
        process_batch_tasks(batch_file, context).await?;
    } else if let Some(url) = &args.url {
        process_single_task(url, &context).await?;
    }

    Ok(())
}

/// 解析单个链接并按输出模式打印结果
pub async fn process_single_task(url: &str, context: &ResolveJobContext) -> AppResult<ResolutionOutcome> {
    info!("开始处理 URL: {}", url);
    let json = context.args.json;
    let spinner = (!json).then(|| ui::spinner(&format!("正在解析 {}", ui::truncate_text(url, 60))));

    let result = context
        .service
        .resolve_with_cancel(url, Some(&context.args.format), &context.cancellation_token)
        .await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if json {
        let response = match &result {
            Ok(outcome) => ResolveResponse::from(outcome),
            Err(e) => ResolveResponse::error(e.reason()),
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else if let Ok(outcome) = &result {
        ui::print_outcome(outcome);
    }

    if let Err(e) = &result {
        error!("解析 '{}' 失败: {}", url, e);
    }
    result
}

async fn handle_interactive_mode(context: ResolveJobContext) -> AppResult<()> {
    ui::print_header("交互模式");
    println!(
        "在此模式下，你可以逐一输入视频链接进行解析 (格式: {})。按 {} 可随时退出。",
        context.args.format,
        *symbols::CTRL_C
    );

    loop {
        if context.cancellation_token.is_cancelled() {
            return Err(AppError::UserInterrupt);
        }
        match ui::prompt("请输入视频链接", None) {
            Ok(input) if !input.is_empty() => {
                if let Err(e) = process_single_task(&input, &context).await {
                    log::error!("交互模式任务 '{}' 失败: {}", input, e);
                    if matches!(e, AppError::UserInterrupt) {
                        return Err(e);
                    }
                    if !context.args.json {
                        eprintln!("\n{} 处理任务时发生错误: {}", *symbols::ERROR, e.to_string().red());
                    }
                }
            }
            Ok(_) => break, // 用户输入空行
            Err(_) => return Err(AppError::UserInterrupt), // 用户按 Ctrl+C 或输入结束
        }
    }

    println!("\n{} 退出交互模式。", *symbols::INFO);
    Ok(())
}

async fn process_batch_tasks(batch_file: &Path, context: ResolveJobContext) -> AppResult<()> {
    let content = std::fs::read_to_string(batch_file).map_err(|e| {
        log::error!("读取批量文件 '{}' 失败: {}", batch_file.display(), e);
        AppError::from(e)
    })?;

    let tasks: Vec<String> = content
        .lines()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.starts_with('#'))
        .collect();
    if tasks.is_empty() {
        warn!("批量文件 '{}' 为空或不含有效行。", batch_file.display());
        eprintln!("{} 批量文件 '{}' 为空。", *symbols::WARN, batch_file.display());
        return Ok(());
    }

    let json = context.args.json;
    let mut success = 0;
    let mut failed = 0;
    if !json {
        ui::print_header(&format!("开始批量解析 (按 {} 可随时退出)", *symbols::CTRL_C));
    }
    for (i, task) in tasks.iter().enumerate() {
        if context.cancellation_token.is_cancelled() {
            return Err(AppError::UserInterrupt);
        }
        if !json {
            ui::print_sub_header(&format!(
                "批量任务 {}/{} - {}",
                i + 1,
                tasks.len(),
                ui::truncate_text(task, 60)
            ));
        }
        match process_single_task(task, &context).await {
            Ok(_) => success += 1,
            Err(AppError::UserInterrupt) => return Err(AppError::UserInterrupt),
            Err(e) => {
                failed += 1;
                if !json {
                    eprintln!("\n{} 处理任务时发生错误: {}", *symbols::ERROR, e);
                }
            }
        }
    }

    if !json {
        ui::print_header("批量任务报告");
        println!(
            "{} | {} | 总计: {}",
            format!("成功任务: {}", success).green(),
            format!("失败任务: {}", failed).red(),
            tasks.len()
        );
    }
    if failed > 0 {
        Err(AppError::Other(anyhow!("{} 个批量任务执行失败。", failed)))
    } else {
        Ok(())
    }
}
