use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "crud-cluster-cli")]
#[command(about = "Management CLI for the users API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000", env = "CRUD_CLUSTER_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all users
    List,
    /// Show one user
    Get { id: String },
    /// Create a user
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        age: u32,
        /// Comma-separated hobbies
        #[arg(long, value_delimiter = ',')]
        hobbies: Vec<String>,
    },
    /// Replace a user's fields
    Update {
        id: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        age: u32,
        #[arg(long, value_delimiter = ',')]
        hobbies: Vec<String>,
    },
    /// Delete a user
    Delete { id: String },
    /// Create a sample user
    Seed,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let users = format!("{}/api/users", cli.url.trim_end_matches('/'));

    let res = match cli.command {
        Commands::List => client.get(&users).send().await?,
        Commands::Get { id } => client.get(format!("{users}/{id}")).send().await?,
        Commands::Create { username, age, hobbies } => {
            client
                .post(&users)
                .json(&user_body(&username, age, &hobbies))
                .send()
                .await?
        }
        Commands::Update { id, username, age, hobbies } => {
            client
                .put(format!("{users}/{id}"))
                .json(&user_body(&username, age, &hobbies))
                .send()
                .await?
        }
        Commands::Delete { id } => client.delete(format!("{users}/{id}")).send().await?,
        Commands::Seed => {
            client
                .post(&users)
                .json(&json!({
                    "username": "John Doe",
                    "age": 30,
                    "hobbies": ["reading", "coding", "hiking"],
                }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

fn user_body(username: &str, age: u32, hobbies: &[String]) -> Value {
    json!({ "username": username, "age": age, "hobbies": hobbies })
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
