use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use lottery_client::{
    LotteryApp,
    api::models::RecommendationFilter,
    config::Config,
    store::FetchOutcome,
    utils::{draw_status_label, format_numbers, win_amount_label},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 彩票推荐命令行客户端
#[derive(Parser)]
#[command(name = "lottery-client", about = "查看彩票推荐、开奖结果并标记购买状态")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 登录并保存令牌
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "LOTTERY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// 清除本地令牌
    Logout,
    /// 显示登录状态
    Status,
    /// 列出推荐记录
    List {
        /// 最多加载的页数
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// 彩票代码，如 fc_ssq
        #[arg(long)]
        code: Option<String>,
        /// 期号
        #[arg(long)]
        draw_number: Option<String>,
        /// 推荐生成日期，如 2025-03-04
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// 列出彩票类型
    Types,
    /// 标记购买状态
    Purchase {
        id: i64,
        /// 取消已购买标记
        #[arg(long)]
        unset: bool,
    },
}

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        process::exit(2);
    });

    let app = LotteryApp::from_config(config).await.unwrap_or_else(|e| {
        eprintln!("Failed to initialize client: {}", e);
        process::exit(2);
    });

    let ok = match cli.command {
        Command::Login { username, password } => login(&app, &username, &password).await,
        Command::Logout => {
            app.session.logout().await;
            println!("已退出登录");
            true
        }
        Command::Status => {
            if app.session.is_authenticated() {
                println!("已登录");
            } else {
                println!("未登录");
            }
            true
        }
        Command::List {
            pages,
            code,
            draw_number,
            date,
        } => {
            let filter = RecommendationFilter {
                code,
                draw_number,
                date,
            };
            list(&app, pages, filter).await
        }
        Command::Types => types(&app).await,
        Command::Purchase { id, unset } => purchase(&app, id, !unset).await,
    };

    if !ok {
        process::exit(1);
    }
}

async fn login(app: &LotteryApp, username: &str, password: &str) -> bool {
    if app.session.login(username, password).await {
        println!("登录成功");
        true
    } else {
        eprintln!(
            "登录失败: {}",
            app.session.error().unwrap_or_else(|| "Login failed".to_string())
        );
        false
    }
}

async fn list(app: &LotteryApp, pages: u32, filter: RecommendationFilter) -> bool {
    if !app.session.is_authenticated() {
        tracing::warn!("Not logged in, the server will likely reject the request");
    }

    // 类型名称只用于展示，失败不影响列表
    app.lottery.fetch_lottery_types().await;
    app.lottery.set_filter(filter);

    if app.lottery.fetch_page(true).await == FetchOutcome::Failed {
        eprintln!("{}", app.lottery.error().unwrap_or_default());
        return false;
    }
    for _ in 1..pages {
        match app.lottery.fetch_page(false).await {
            FetchOutcome::Loaded { .. } => {}
            FetchOutcome::Skipped => break,
            FetchOutcome::Failed => {
                eprintln!("{}", app.lottery.error().unwrap_or_default());
                break;
            }
        }
    }

    let items = app.lottery.items();
    if items.is_empty() {
        println!("暂无推荐记录");
        return true;
    }

    for rec in &items {
        println!(
            "#{:<6} {:<8} 期号 {:<10} {:<4} {}  号码: {}",
            rec.id,
            app.lottery.lookup_type_name(rec.lottery_type_id),
            rec.draw_number,
            draw_status_label(rec),
            if rec.is_purchased { "已购" } else { "未购" },
            format_numbers(&rec.number_groups()),
        );
        match rec.outcome() {
            Some(outcome) => println!(
                "        开奖: {}  结果: {}  中奖: {}",
                outcome.draw_time.format("%Y-%m-%d %H:%M"),
                if outcome.draw_result.is_empty() { "无" } else { outcome.draw_result },
                win_amount_label(rec),
            ),
            None => println!(
                "        预计开奖: {}",
                rec.expected_draw_time.format("%Y-%m-%d")
            ),
        }
    }

    let cursor = app.lottery.cursor();
    println!(
        "共 {} 条，已加载 {} 条{}",
        cursor.total,
        items.len(),
        if cursor.has_more { "，还有更多" } else { "" }
    );
    true
}

async fn types(app: &LotteryApp) -> bool {
    if app.lottery.fetch_lottery_types().await == FetchOutcome::Failed {
        eprintln!("{}", app.lottery.types_error().unwrap_or_default());
        return false;
    }
    for t in app.lottery.lottery_types() {
        println!(
            "{:<4} {:<10} {:<8} {:<16} {}",
            t.id,
            t.code,
            t.name,
            t.schedule_cron,
            if t.is_active { "启用" } else { "停用" }
        );
    }
    true
}

async fn purchase(app: &LotteryApp, id: i64, value: bool) -> bool {
    if app.lottery.update_purchase_flag(id, value).await {
        println!("推荐 {} 已{}", id, if value { "标记为已购买" } else { "取消购买标记" });
        true
    } else {
        eprintln!("{}", app.lottery.error().unwrap_or_default());
        false
    }
}
