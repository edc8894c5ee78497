mod format;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use crate::config::Config;
use crate::services::data_loader::LoadResult;
use crate::services::projection::{revenue_projection, service_growth_projection};
use crate::services::{Aggregator, DataLoaderService, Insights};
use crate::sources::{FileTransport, HttpTransport};
use crate::types::{OrderBundle, ReportClock, SalesChartPoint, ServiceType};

use format::{format_bar, format_change, format_money};

const BAR_WIDTH: usize = 20;

/// Order analytics for nannies, gear-refresh and home-care services
#[derive(Parser)]
#[command(name = "orderpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.orderpulse/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read exported JSON files from this directory instead of the API
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Current vs previous month dashboard
    Stats {
        /// Restrict to one service (nannies, gear-refresh, home-care)
        #[arg(long)]
        service: Option<ServiceType>,
    },

    /// Last 7 days of sales vs the week before
    Sales {
        #[arg(long)]
        service: Option<ServiceType>,
    },

    /// Weekly earnings and week-of-month comparison
    Earnings {
        #[arg(long)]
        service: Option<ServiceType>,
    },

    /// Top cities and map markers
    Geo {
        #[arg(long)]
        service: Option<ServiceType>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Peak hours, weekday pattern and seasonality
    Temporal {
        #[arg(long)]
        service: Option<ServiceType>,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Highest-spending customers
    Customers {
        #[arg(long)]
        service: Option<ServiceType>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Top services and products
    Products {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Revenue projection from the last three months
    Projection {
        #[arg(long)]
        service: Option<ServiceType>,
        /// Months to project
        #[arg(long, default_value_t = 3)]
        months: u32,
    },

    /// Overview across all services (default)
    Report,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let result = self.load(&config).await?;
        for service in &result.failed_services {
            eprintln!("[orderpulse] Warning: no data for {}", service);
        }

        let clock = ReportClock::local();
        let command = self.command.unwrap_or(Commands::Report);
        render(&command, &result.bundle, &clock, self.json)
    }

    async fn load(&self, config: &Config) -> anyhow::Result<LoadResult> {
        let result = match &self.data_dir {
            Some(dir) => {
                DataLoaderService::from_config(FileTransport::new(dir), config)
                    .load()
                    .await?
            }
            None => {
                DataLoaderService::from_config(HttpTransport::new(config.clone())?, config)
                    .load()
                    .await?
            }
        };
        Ok(result)
    }
}

fn scoped(bundle: &OrderBundle, service: Option<ServiceType>) -> OrderBundle {
    match service {
        Some(s) => bundle.only(s),
        None => bundle.clone(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render(
    command: &Commands,
    bundle: &OrderBundle,
    clock: &ReportClock,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Stats { service } => {
            let scope = scoped(bundle, *service);
            let stats = Aggregator::dashboard_stats(&scope.orders, *service, clock);
            if json {
                return print_json(&stats);
            }
            let rows = [
                ("Revenue", format_money(stats.total_revenue), format_change(stats.revenue_change)),
                ("Profit", format_money(stats.total_profit), format_change(stats.profit_change)),
                ("Cost", format_money(stats.total_cost), String::new()),
                ("Orders", stats.total_orders.to_string(), format_change(stats.orders_change)),
                ("  completed", stats.completed_orders.to_string(), String::new()),
                ("  pending", stats.pending_orders.to_string(), String::new()),
                (
                    "Avg order",
                    String::new(),
                    format_change(stats.average_order_value_change),
                ),
            ];
            for (label, value, change) in rows {
                println!("{:<14} {:>14}  {}", label, value, change);
            }
        }
        Commands::Sales { service } => {
            let scope = scoped(bundle, *service);
            let series = Aggregator::weekly_sales(&scope.orders, clock);
            if json {
                return print_json(&series);
            }
            print_series(&series);
        }
        Commands::Earnings { service } => {
            let scope = scoped(bundle, *service);
            let weekly = Aggregator::weekly_earnings(&scope.orders, clock);
            let monthly = Aggregator::monthly_earnings(&scope.orders, clock);
            if json {
                return print_json(&json!({ "weekly": weekly, "monthly": monthly }));
            }
            print_series(&weekly);
            println!();
            println!(
                "{:<8} {:>14} {:>14} {:>14}",
                "", "This month", "1 month ago", "2 months ago"
            );
            for week in &monthly {
                println!(
                    "{:<8} {:>14} {:>14} {:>14}",
                    week.week,
                    format_money(week.current_month),
                    format_money(week.one_month_ago),
                    format_money(week.two_months_ago)
                );
            }
        }
        Commands::Geo { service, limit } => {
            let scope = scoped(bundle, *service);
            let by_orders = Insights::top_cities_by_orders(&scope.orders, *limit);
            let by_revenue = Insights::top_cities_by_revenue(&scope.orders, *limit);
            let markers = Insights::geographic_markers(&scope);
            if json {
                return print_json(&json!({
                    "topCitiesByOrders": by_orders,
                    "topCitiesByRevenue": by_revenue,
                    "markers": markers,
                }));
            }
            println!(
                "{:<20} {:<12} {:>8} {:>14}",
                "City", "Country", "Orders", "Revenue"
            );
            for city in &by_revenue {
                println!(
                    "{:<20} {:<12} {:>8} {:>14}",
                    city.city,
                    city.country,
                    city.order_count,
                    format_money(city.total_revenue)
                );
            }
            println!("{} map markers", markers.len());
        }
        Commands::Temporal { service, limit } => {
            let scope = scoped(bundle, *service);
            let hours = Insights::peak_hours(&scope.orders, clock, *limit);
            let weekdays = Insights::weekly_patterns(&scope.orders, clock);
            let seasons = Insights::seasonal_trends(&scope.orders, clock);
            if json {
                return print_json(&json!({
                    "peakHours": hours,
                    "weeklyPatterns": weekdays,
                    "seasonalTrends": seasons,
                }));
            }
            println!("Peak hours");
            for h in &hours {
                println!(
                    "  {}  {:>6} orders  {:>14}",
                    h.display_hour,
                    h.order_count,
                    format_money(h.total_revenue)
                );
            }
            println!("Weekdays");
            let busiest = weekdays.iter().map(|d| d.order_count).max().unwrap_or(0) as f64;
            for d in &weekdays {
                println!(
                    "  {:<10} {} {}",
                    d.day,
                    format_bar(d.order_count as f64, busiest, BAR_WIDTH),
                    d.order_count
                );
            }
            println!("Months");
            for m in &seasons {
                println!(
                    "  {:<10} {:>6} orders  avg {:>12}",
                    m.month,
                    m.order_count,
                    format_money(m.average_order_value)
                );
            }
        }
        Commands::Customers { service, limit } => {
            let scope = scoped(bundle, *service);
            let customers = Insights::high_value_customers(&scope.orders, *limit);
            if json {
                return print_json(&customers);
            }
            println!(
                "{:<24} {:>8} {:>14} {:>14}",
                "Customer", "Orders", "Spent", "Avg"
            );
            for c in &customers {
                println!(
                    "{:<24} {:>8} {:>14} {:>14}",
                    c.name,
                    c.order_count,
                    format_money(c.total_spent),
                    format_money(c.average_order_value)
                );
            }
        }
        Commands::Products { limit } => {
            let services = Aggregator::top_services(bundle, *limit);
            let products = Aggregator::top_products(bundle, *limit);
            if json {
                return print_json(&json!({ "services": services, "products": products }));
            }
            for p in services.iter().chain(products.iter()) {
                println!(
                    "{:<40} {:>6} {:>4} {:>14}",
                    p.name,
                    p.orders,
                    p.currency,
                    format_money(p.revenue)
                );
            }
        }
        Commands::Projection { service, months } => {
            if json {
                return match service {
                    Some(s) => print_json(&revenue_projection(
                        bundle.service_orders(*s),
                        clock,
                        *months,
                    )),
                    None => print_json(&json!({
                        "revenue": revenue_projection(&bundle.orders, clock, *months),
                        "serviceGrowth": service_growth_projection(bundle, clock, *months),
                    })),
                };
            }
            let orders = match service {
                Some(s) => bundle.service_orders(*s),
                None => bundle.orders.as_slice(),
            };
            let points = revenue_projection(orders, clock, *months);
            if points.is_empty() {
                println!("Not enough history for a projection");
            }
            for p in &points {
                let kind = if p.actual.is_some() {
                    "actual"
                } else {
                    "projected"
                };
                println!("{:<10} {:>14}  {}", p.month, format_money(p.projected), kind);
            }
        }
        Commands::Report => {
            let stats = Aggregator::dashboard_stats(&bundle.orders, None, clock);
            let breakdown = Aggregator::service_breakdown(bundle);
            let visitors = Aggregator::visitors_by_service(bundle);
            let recent = Aggregator::recent_transactions(bundle, 5);
            if json {
                return print_json(&json!({
                    "stats": stats,
                    "serviceBreakdown": breakdown,
                    "visitors": visitors,
                    "recentTransactions": recent,
                }));
            }
            println!(
                "Revenue {} ({})  Profit {}  Orders {}",
                format_money(stats.total_revenue),
                format_change(stats.revenue_change),
                format_money(stats.total_profit),
                stats.total_orders
            );
            let max = breakdown.iter().map(|b| b.value).fold(0.0, f64::max);
            for (b, v) in breakdown.iter().zip(&visitors) {
                println!(
                    "  {:<22} {} {:>14}  {} orders",
                    b.name,
                    format_bar(b.value, max, BAR_WIDTH),
                    format_money(b.value),
                    v.orders
                );
            }
            println!("Recent");
            for t in &recent {
                let date = t
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {} {:<14} {:<20} {:>4} {:>12}  {}",
                    date,
                    t.order_id,
                    t.customer_name,
                    t.currency,
                    format_money(t.amount),
                    t.status.label()
                );
            }
        }
    }
    Ok(())
}

fn print_series(series: &[SalesChartPoint]) {
    let max = series
        .iter()
        .map(|p| p.current.max(p.previous))
        .fold(0.0, f64::max);
    println!("{:<14} {:>14} {:>14}", "Day", "Current", "Previous");
    for point in series {
        println!(
            "{:<14} {:>14} {:>14}  {}",
            point.date,
            format_money(point.current),
            format_money(point.previous),
            format_bar(point.current, max, BAR_WIDTH)
        );
    }
}
