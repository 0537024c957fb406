use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, Response};

#[derive(Parser)]
#[command(name = "house-search-cli")]
#[command(about = "House search CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "HOUSE_SEARCH_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue a (re)index of a house
    Index {
        #[arg(value_name = "HOUSE_ID")]
        id: u64,
    },

    /// Queue the removal of a house from the index
    Delete {
        #[arg(value_name = "HOUSE_ID")]
        id: u64,
    },

    /// Search houses
    Search {
        #[arg(short, long)]
        city: String,

        #[arg(short, long, default_value = "")]
        keyword: String,

        #[arg(short, long)]
        region: Option<String>,

        #[arg(long)]
        price_min: Option<i32>,

        #[arg(long)]
        price_max: Option<i32>,

        #[arg(long)]
        area_min: Option<i32>,

        #[arg(long)]
        area_max: Option<i32>,

        #[arg(long)]
        direction: Option<i32>,

        #[arg(long)]
        rent_way: Option<i32>,

        /// lastUpdateTime, createTime, price, area or distanceToSubway
        #[arg(short, long)]
        order_by: Option<String>,

        /// asc or desc
        #[arg(short = 'd', long)]
        sort_direction: Option<String>,

        #[arg(short, long, default_value = "1")]
        page: u32,

        #[arg(short = 's', long, default_value = "10")]
        page_size: u32,
    },

    /// Autocomplete a prefix
    Suggest {
        #[arg(value_name = "PREFIX")]
        prefix: String,

        #[arg(short, long)]
        size: Option<usize>,
    },

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    let response = match cli.command {
        Commands::Index { id } => {
            client
                .put(format!("{}/v1/houses/{}/index", cli.endpoint, id))
                .send()
                .await?
        }

        Commands::Delete { id } => {
            client
                .delete(format!("{}/v1/houses/{}/index", cli.endpoint, id))
                .send()
                .await?
        }

        Commands::Search {
            city,
            keyword,
            region,
            price_min,
            price_max,
            area_min,
            area_max,
            direction,
            rent_way,
            order_by,
            sort_direction,
            page,
            page_size,
        } => {
            let mut query: Vec<(&str, String)> = vec![
                ("city_en_name", city),
                ("keyword", keyword),
                ("page", page.to_string()),
                ("page_size", page_size.to_string()),
            ];

            let optional = [
                ("region_en_name", region),
                ("price_min", price_min.map(|v| v.to_string())),
                ("price_max", price_max.map(|v| v.to_string())),
                ("area_min", area_min.map(|v| v.to_string())),
                ("area_max", area_max.map(|v| v.to_string())),
                ("direction", direction.map(|v| v.to_string())),
                ("rent_way", rent_way.map(|v| v.to_string())),
                ("order_by", order_by),
                ("sort_direction", sort_direction),
            ];
            query.extend(
                optional
                    .into_iter()
                    .filter_map(|(key, value)| value.map(|v| (key, v))),
            );

            client
                .get(format!("{}/v1/houses/search", cli.endpoint))
                .query(&query)
                .send()
                .await?
        }

        Commands::Suggest { prefix, size } => {
            let mut query = vec![("prefix", prefix)];
            if let Some(size) = size {
                query.push(("size", size.to_string()));
            }

            client
                .get(format!("{}/v1/houses/suggest", cli.endpoint))
                .query(&query)
                .send()
                .await?
        }

        Commands::Health => {
            client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?
        }
    };

    print_body(response).await
}

async fn print_body(response: Response) -> Result<()> {
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .with_context(|| format!("Server responded with {} and no JSON body", status))?;

    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        anyhow::bail!("Request failed with status {}", status);
    }
    Ok(())
}
