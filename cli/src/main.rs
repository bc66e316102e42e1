//! Pubstat CLI: publication statistics from the command line
//!
//! Uses the pubstat-sdk RemoteClient to read from a Directus instance, or an
//! EmbeddedClient seeded from a JSON dump when `--data` is given.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::{ContentArrangement, Table};
use pubstat_sdk::{
    AggregateRow, CmsClient, Config, Dashboard, DashboardProfile, Dimension, Drilldown,
    EmbeddedClient, FilterCriteria, NodeId, Profile, ReleaseStatus, RemoteClient, SearchCriteria,
    TimeRange, TreeNode,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pubstat", version, about = "Publication statistics for CMS-managed hierarchies")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "PUBSTAT_CONFIG")]
    config: Option<PathBuf>,

    /// CMS base URL, overriding the configuration
    #[arg(long, global = true)]
    url: Option<String>,

    /// Read collections from a JSON dump instead of a server
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Entity family to report on (flows or rules)
    #[arg(long, global = true)]
    profile: Option<Profile>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum By {
    Entity,
    Org,
}

impl By {
    fn dimension(self) -> Dimension {
        match self {
            By::Entity => Dimension::Entity,
            By::Org => Dimension::Organization,
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
struct SearchArgs {
    /// Entity node id; repeatable. None means every root node.
    #[arg(long = "entity")]
    entities: Vec<String>,

    /// Organization id; repeatable. None means no organization restriction.
    #[arg(long = "org")]
    orgs: Vec<String>,

    /// Match descendants of the selected entity nodes
    #[arg(long)]
    descendants: bool,

    /// Match only the selected organizations, not their sub-organizations
    #[arg(long)]
    exclude_sub_orgs: bool,

    /// Window start (YYYY-MM-DD or full timestamp)
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// Window end; a bare date covers the whole day
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Release status: added, revised or abolished
    #[arg(long)]
    status: Option<ReleaseStatus>,

    /// Confidentiality level
    #[arg(long)]
    confidentiality: Option<i64>,
}

impl SearchArgs {
    fn criteria(&self) -> CliResult<SearchCriteria> {
        let time_range = match (&self.from, &self.to) {
            (Some(from), Some(to)) => Some(TimeRange::parse(from, to)?),
            _ => None,
        };
        Ok(SearchCriteria {
            entities: self.entities.iter().map(|id| NodeId::from(id.as_str())).collect(),
            include_descendants: self.descendants,
            orgs: self.orgs.iter().map(|id| NodeId::from(id.as_str())).collect(),
            include_sub_orgs: !self.exclude_sub_orgs,
            filters: FilterCriteria {
                time_range,
                release_status: self.status,
                confidentiality: self.confidentiality,
            },
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print a hierarchy as a tree
    Tree {
        /// Show the organization hierarchy instead of the entity hierarchy
        #[arg(long)]
        orgs: bool,
    },
    /// Count publications per bucket and month
    Search {
        #[command(flatten)]
        search: SearchArgs,

        /// Dimension to report
        #[arg(long, value_enum, default_value = "entity")]
        by: By,
    },
    /// Search, then split the selected rows by release status
    Drill {
        /// Bucket id to drill into
        #[arg(long, required_unless_present = "label")]
        bucket: Option<String>,

        /// Month label (YYYY.M) to drill into
        #[arg(long)]
        label: Option<String>,

        #[command(flatten)]
        search: SearchArgs,

        #[arg(long, value_enum, default_value = "entity")]
        by: By,
    },
    /// Search and write every dataset to a JSON file
    Export {
        /// Output file
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        search: SearchArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_env();
    if let Some(url) = &cli.url {
        config.server.url = url.clone();
    }
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }
    config.validate()?;
    let profile = DashboardProfile::from_config(&config);

    match &cli.data {
        Some(path) => {
            let client = load_dump(path).await?;
            let (email, password) = config.credentials().unwrap_or(("offline", "offline"));
            client.login(email, password).await?;
            execute(Dashboard::new(client, profile), &cli.command, &cli.format).await
        }
        None => {
            let (email, password) = config.credentials().ok_or(
                "missing credentials: set PUBSTAT_EMAIL and PUBSTAT_PASSWORD \
                 or server.email and server.password in the config file",
            )?;
            let client = RemoteClient::from_settings(&config.server)?;
            client.login(email, password).await?;
            execute(Dashboard::new(client, profile), &cli.command, &cli.format).await
        }
    }
}

/// Seed an EmbeddedClient from `{"collection": [rows...], ...}`
async fn load_dump(path: &Path) -> CliResult<EmbeddedClient> {
    let text = std::fs::read_to_string(path)?;
    let dump: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)?;

    let client = EmbeddedClient::new();
    for (collection, rows) in dump {
        match rows {
            serde_json::Value::Array(rows) => client.insert(&collection, rows).await,
            _ => return Err(format!("collection {} is not an array", collection).into()),
        }
    }
    info!("Loaded dump {:?}", path);
    Ok(client)
}

async fn execute<C: CmsClient>(
    mut dashboard: Dashboard<C>,
    command: &Commands,
    format: &OutputFormat,
) -> CliResult<()> {
    dashboard.load().await?;

    match command {
        Commands::Tree { orgs } => {
            let tree = if *orgs {
                dashboard.org_tree()?
            } else {
                dashboard.entity_tree()?
            };
            print_tree(&tree, format)
        }
        Commands::Search { search, by } => {
            let results = dashboard.search(&search.criteria()?).await?;
            print_rows(results.rows(by.dimension()), format)
        }
        Commands::Drill {
            bucket,
            label,
            search,
            by,
        } => {
            dashboard.search(&search.criteria()?).await?;
            let bucket = bucket.as_deref().map(NodeId::from);
            let drilldown = dashboard.drill_down(by.dimension(), bucket.as_ref(), label.as_deref())?;
            print_drilldown(drilldown, format)
        }
        Commands::Export { out, search } => {
            let results = dashboard.search(&search.criteria()?).await?;
            let file = std::fs::File::create(out)?;
            serde_json::to_writer_pretty(file, results)?;
            println!(
                "Wrote {} records to {}",
                results.records.len(),
                out.display()
            );
            Ok(())
        }
    }
}

fn print_tree(tree: &[TreeNode], format: &OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(tree)?);
        }
        OutputFormat::Csv => {
            println!("key,title,path,depth");
            for root in tree {
                for (depth, node) in root.walk() {
                    println!(
                        "{},{},{},{}",
                        csv_field(node.key.as_str()),
                        csv_field(&node.title),
                        csv_field(&node.path),
                        depth
                    );
                }
            }
        }
        OutputFormat::Table => {
            if tree.is_empty() {
                println!("(empty hierarchy)");
                return Ok(());
            }
            let mut total = 0;
            for root in tree {
                for (depth, node) in root.walk() {
                    println!("{}{} [{}]", "  ".repeat(depth), node.title, node.key);
                    total += 1;
                }
            }
            println!("{} node(s)", total);
        }
    }
    Ok(())
}

fn print_rows(rows: &[AggregateRow], format: &OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        }
        OutputFormat::Csv => {
            println!("bucketId,bucketName,pubTimeLabel,addCount,reviseCount,abolishCount,totalCount");
            for row in rows {
                println!(
                    "{},{},{},{},{},{},{}",
                    csv_field(row.bucket_id.as_str()),
                    csv_field(&row.bucket_name),
                    row.pub_time_label,
                    row.add_count,
                    row.revise_count,
                    row.abolish_count,
                    row.total_count
                );
            }
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("(no results)");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Bucket", "Month", "Added", "Revised", "Abolished", "Total"]);
            for row in rows {
                table.add_row(vec![
                    row.bucket_name.clone(),
                    row.pub_time_label.clone(),
                    row.add_count.to_string(),
                    row.revise_count.to_string(),
                    row.abolish_count.to_string(),
                    row.total_count.to_string(),
                ]);
            }

            println!("{}", table);
            println!("{} row(s)", rows.len());
        }
    }
    Ok(())
}

fn print_drilldown(drilldown: &Drilldown, format: &OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(drilldown)?);
        }
        OutputFormat::Csv => {
            println!("bucketId,bucketName,pubTimeLabel,releaseStatusLabel,pubCount");
            for bar in &drilldown.bars {
                println!(
                    "{},{},{},{},{}",
                    csv_field(bar.bucket_id.as_str()),
                    csv_field(&bar.bucket_name),
                    bar.pub_time_label,
                    bar.release_status_label,
                    bar.pub_count
                );
            }
        }
        OutputFormat::Table => {
            let mut bars = Table::new();
            bars.set_content_arrangement(ContentArrangement::Dynamic);
            bars.set_header(vec!["Bucket", "Month", "Status", "Count"]);
            for bar in &drilldown.bars {
                bars.add_row(vec![
                    bar.bucket_name.clone(),
                    bar.pub_time_label.clone(),
                    bar.release_status_label.clone(),
                    bar.pub_count.to_string(),
                ]);
            }
            println!("{}", bars);

            let mut line = Table::new();
            line.set_header(vec!["Month", "Total"]);
            for month in &drilldown.line {
                line.add_row(vec![month.pub_time_label.clone(), month.pub_count.to_string()]);
            }
            println!("{}", line);
        }
    }
    Ok(())
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_search_flags() {
        let cli = Cli::try_parse_from([
            "pubstat", "--format", "csv", "search", "--entity", "1", "--entity", "2",
            "--org", "10", "--descendants", "--exclude-sub-orgs", "--from", "2024-01-01",
            "--to", "2024-03-31", "--status", "revised", "--by", "org",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Csv);

        let Commands::Search { search, by } = cli.command else {
            panic!("expected search");
        };
        assert_eq!(by, By::Org);
        let criteria = search.criteria().unwrap();
        assert_eq!(criteria.entities, vec![NodeId::new("1"), NodeId::new("2")]);
        assert!(criteria.include_descendants);
        assert!(!criteria.include_sub_orgs);
        assert_eq!(criteria.filters.release_status, Some(ReleaseStatus::Revised));
        assert!(criteria.filters.time_range.is_some());
    }

    #[test]
    fn test_window_needs_both_bounds() {
        assert!(Cli::try_parse_from(["pubstat", "search", "--from", "2024-01-01"]).is_err());
        let cli =
            Cli::try_parse_from(["pubstat", "search", "--from", "2024-02-01", "--to", "2024-01-01"])
                .unwrap();
        let Commands::Search { search, .. } = cli.command else {
            panic!("expected search");
        };
        assert!(search.criteria().is_err());
    }

    #[test]
    fn test_drill_requires_target() {
        assert!(Cli::try_parse_from(["pubstat", "drill"]).is_err());
        assert!(Cli::try_parse_from(["pubstat", "drill", "--label", "2024.1"]).is_ok());
        let cli = Cli::try_parse_from(["pubstat", "--profile", "rules", "drill", "--bucket", "7"])
            .unwrap();
        assert_eq!(cli.profile, Some(Profile::Rules));
    }

    #[test]
    fn test_csv_field() {
        assert_eq!(csv_field("Sales"), "Sales");
        assert_eq!(csv_field("Sales, EMEA"), "\"Sales, EMEA\"");
        assert_eq!(csv_field("the \"core\""), "\"the \"\"core\"\"\"");
    }

    #[tokio::test]
    async fn test_load_dump_and_search() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            serde_json::json!({
                "jecn_flow_structure": [
                    {"FLOW_ID": 1, "PRE_FLOW_ID": 0, "FLOW_NAME": "Sales", "T_PATH": "001", "SORT_ID": 1}
                ],
                "jecn_flow_org": [],
                "jecn_flow_structure_h": [
                    {"GUID": "a", "FLOW_ID": 1, "T_PATH": "001", "PUB_TIME": "2024-01-05T00:00:00", "release_status": 0}
                ]
            })
        )
        .unwrap();

        let client = load_dump(file.path()).await.unwrap();
        client.login("offline", "offline").await.unwrap();
        let mut dashboard = Dashboard::new(client, DashboardProfile::flows());
        dashboard.load().await.unwrap();

        let args = SearchArgs {
            from: Some("2024-01-01".to_string()),
            to: Some("2024-01-31".to_string()),
            ..Default::default()
        };
        let results = dashboard.search(&args.criteria().unwrap()).await.unwrap();
        assert_eq!(results.by_entity.len(), 1);
        assert_eq!(results.by_entity[0].add_count, 1);
    }

    #[tokio::test]
    async fn test_load_dump_rejects_non_arrays() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::json!({"jecn_flow_org": {"ORG_ID": 1}})).unwrap();
        assert!(load_dump(file.path()).await.is_err());
    }
}
