use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = sessions_api::Args::parse();

	sessions_api::run(args).await
}
