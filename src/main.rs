#[tokio::main]
async fn main() -> anyhow::Result<()> {
    travel_expenses::cli::run_with_sys_args().await
}
