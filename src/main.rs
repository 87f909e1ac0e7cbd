use anyhow::Result;
use face_scan_submit::config::Config;
use face_scan_submit::logger;
use face_scan_submit::orchestrator::App;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
