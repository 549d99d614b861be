//! Zeph Infra - 仓库到容器的部署代理
//!
//! Usage:
//! - Normal mode: `zeph-infra`
//! - With custom port: `zeph-infra --port 4000`

use zeph_infra::RuntimeConfig;

/// 解析命令行参数
fn parse_args() -> RuntimeConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = RuntimeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                config.port_override = args[i + 1].parse().ok();
                if config.port_override.is_none() {
                    eprintln!("Ignoring invalid port: {}", args[i + 1]);
                }
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
                i += 1;
            }
        }
    }

    config
}

fn print_help() {
    println!("Zeph Infra - repository-to-container deploy agent");
    println!();
    println!("USAGE:");
    println!("    zeph-infra [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --port <PORT>    Override the listening port (default: $PORT or 3000)");
    println!("    -h, --help       Print help information");
    println!();
    println!("ENVIRONMENT:");
    println!("    PORT, REPOS_DIR, DEPLOY_NAME_PREFIX,");
    println!("    CLONE_TIMEOUT_SECS, BUILD_TIMEOUT_SECS, START_TIMEOUT_SECS, PROBE_TIMEOUT_SECS");
}

fn main() {
    let config = parse_args();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(zeph_infra::init_and_run_agent_with_config(config)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
