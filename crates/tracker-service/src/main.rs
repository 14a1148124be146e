//! Main entry point for the order progress tracker.
//!
//! Loads the configuration, assembles the tracker from the configured
//! implementations and runs one command against the seller's in-progress
//! orders.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracker_config::Config;
use tracker_core::{InProgressOrders, OrderProgress};
use tracker_types::{Carrier, SortOrder, UNSELECTED_CARRIER};

mod factory_registry;
mod opener;

use factory_registry::build_tracker_from_config;
use opener::TerminalLinkOpener;

/// Command-line arguments for the tracker.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", env = "TRACKER_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
	/// List in-progress orders with their checklist
	Orders {
		/// Sort by order date: asc or desc (default from config)
		#[arg(long)]
		sort: Option<SortOrder>,
	},
	/// Toggle a checklist step of an order
	Toggle { order_id: String, index: usize },
	/// Submit carrier and tracking number for a delivery order
	Deliver {
		order_id: String,
		#[arg(long, default_value = UNSELECTED_CARRIER)]
		carrier: String,
		#[arg(long, default_value = "")]
		tracking: String,
	},
	/// Reopen submitted delivery details for editing
	Edit { order_id: String },
	/// Open the seller's chat channel
	Chat,
}

/// Main entry point for the tracker.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Invalid config path: {}", args.config.display()))?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.tracker.id);

	let tracker = build_tracker_from_config(config)?;
	let mut screen = tracker.screen();
	let summary = screen.refresh().await?;
	if summary.is_partial() {
		for failure in &summary.failed {
			eprintln!("{} 주문을 불러오지 못했습니다: {}", failure.status.label(), failure.reason);
		}
	}

	run(args.command, &mut screen).await
}

/// Runs one command against a refreshed screen.
async fn run(
	command: Command,
	screen: &mut InProgressOrders,
) -> Result<(), Box<dyn std::error::Error>> {
	match command {
		Command::Orders { sort } => {
			if let Some(sort) = sort {
				screen.set_sort_order(sort);
			}
			println!("{} ({}건)", screen.sort_order().label(), screen.orders().len());
			let ids: Vec<String> = screen.orders().iter().map(|o| o.id.clone()).collect();
			for id in ids {
				if let Some(progress) = screen.progress(&id).await {
					println!("{}", render(&progress));
				}
			}
		},
		Command::Toggle { order_id, index } => {
			let mut progress = mount(screen, &order_id).await?;
			let result = progress.toggle_step(index).await;
			println!("{}", render(&progress));
			if let Some(status) = result? {
				println!("주문 상태 변경 완료: {}", status.label());
			}
		},
		Command::Deliver {
			order_id,
			carrier,
			tracking,
		} => {
			let mut progress = mount(screen, &order_id).await?;
			let result = progress
				.submit_delivery(carrier.parse::<Carrier>().ok(), &tracking)
				.await;
			println!("{}", render(&progress));
			result?;
			println!("배송 정보가 업데이트되었습니다.");
		},
		Command::Edit { order_id } => {
			let mut progress = mount(screen, &order_id).await?;
			progress.edit_delivery().await?;
			println!("{}", render(&progress));
		},
		Command::Chat => screen.open_chat(&TerminalLinkOpener).await?,
	}
	Ok(())
}

async fn mount(screen: &InProgressOrders, order_id: &str) -> Result<OrderProgress, String> {
	screen
		.progress(order_id)
		.await
		.ok_or_else(|| format!("Order {} is not in progress", order_id))
}

/// One order card as text.
fn render(progress: &OrderProgress) -> String {
	let order = progress.order();
	let mut lines = vec![format!(
		"{} [{}] {} {}",
		order.id,
		order.mode.label(),
		progress.status().label(),
		order.order_date.as_deref().unwrap_or("-"),
	)];

	let labels = order.mode.step_labels();
	for (index, (label, done)) in labels.iter().zip(progress.steps().as_slice()).enumerate() {
		let mark = if *done { "x" } else { " " };
		lines.push(format!("  {}. [{}] {}", index, mark, label));
	}
	lines.push(format!(
		"  진행 {}/{} ({:.0}%)",
		progress.progress(),
		labels.len() - 1,
		progress.fill_ratio() * 100.0
	));

	if progress.can_edit_delivery() {
		let delivery = progress.delivery();
		lines.push(format!(
			"  배송: {} {}{}",
			delivery.carrier_label(),
			delivery.tracking_number,
			if delivery.submitted { " (제출됨)" } else { "" }
		));
	}
	lines.join("\n")
}
