use clap::Parser;
use colored::Colorize;

use shortener::config::{DEFAULT_CONFIG_PATH, StaticConfig, get_config, init_config_from};
use shortener::errors::ShortenerError;
use shortener::runtime::server::run_server;
use shortener::system::init_logging;

/// Per-user URL shortener
#[derive(Parser, Debug)]
#[command(name = "shortener", version, about)]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// 打印示例配置后退出
    #[arg(long)]
    generate_config: bool,
}

#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.generate_config {
        println!("{}", StaticConfig::generate_sample_config());
        return;
    }

    init_config_from(&args.config);
    let config = get_config();

    // guard 需要活到进程结束
    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_server().await {
        match e.downcast_ref::<ShortenerError>() {
            Some(err) => eprintln!("{}\n  {:#}", err.format_colored(), e),
            None => eprintln!("{} {:#}", "[ERROR]".red().bold(), e),
        }
        std::process::exit(1);
    }
}
