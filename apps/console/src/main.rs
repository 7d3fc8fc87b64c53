use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use console_core::{
    HttpInstanceGateway, InstanceDirectory, InstanceGateway, InstanceLifecycleController,
    NamespaceDirectory, NamespaceQueryConsole, Navigator, NotificationSink, QueryRow, SessionState,
};
use shared::{
    domain::{InstanceId, InstanceRecord, TtlFile},
    protocol::CreateInstanceRequest,
};
use tokio::sync::mpsc;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "console", about = "Operator console for remote graph-database instances")]
struct Args {
    /// Control-plane base URL.
    #[arg(long, env = "CONSOLE_SERVER_URL")]
    server_url: Url,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all managed instances.
    Instances,
    /// Create a new instance.
    CreateInstance {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 9999)]
        port: u16,
        #[arg(long, default_value = "data/")]
        install_path: String,
        #[arg(long, default_value = "512M")]
        min_memory: String,
        #[arg(long, default_value = "1024M")]
        max_memory: String,
        #[arg(long, default_value = "localhost")]
        ip_address: String,
    },
    /// Toggle one instance between running and stopped.
    Toggle { id: i64 },
    /// List the namespaces of one instance.
    Namespaces { id: i64 },
    /// Create a namespace on one instance.
    CreateNamespace { id: i64, name: String },
    /// Run a SPARQL query against a namespace.
    Query {
        id: i64,
        namespace: String,
        query: String,
    },
    /// Upload a TTL file into a namespace.
    Upload {
        id: i64,
        namespace: String,
        file: PathBuf,
    },
}

/// Terminal frontend: notifications go to stderr, view headings to
/// stdout.
struct CliFrontend;

impl NotificationSink for CliFrontend {
    fn notify_success(&self, message: &str) {
        eprintln!("ok: {message}");
    }

    fn notify_error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn notify_info(&self, message: &str) {
        eprintln!("info: {message}");
    }
}

impl Navigator for CliFrontend {
    fn show_instance_list(&self) {
        println!("# instances");
    }

    fn show_namespace_view(&self, instance_id: InstanceId) {
        println!("# namespaces of instance {}", instance_id.0);
    }
}

fn print_instances(instances: &[InstanceRecord]) {
    for record in instances {
        println!(
            "{}\t{}\t{}:{}\tpid={}\t{}",
            record.id.0,
            record.instance_name,
            record.ip_address,
            record.port,
            record.pid,
            record.status.as_str(),
        );
    }
}

fn print_rows(rows: &[QueryRow]) {
    let Some(first) = rows.first() else {
        return;
    };
    println!("{}", first.columns().collect::<Vec<_>>().join("\t"));
    for row in rows {
        let line: Vec<&str> = row.cells().iter().map(|(_, value)| value.as_str()).collect();
        println!("{}", line.join("\t"));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let frontend = Arc::new(CliFrontend);
    let gateway: Arc<dyn InstanceGateway> =
        Arc::new(HttpInstanceGateway::new(args.server_url.as_str()));
    let notifier: Arc<dyn NotificationSink> = frontend.clone();

    match args.command {
        Command::Instances => {
            let directory = InstanceDirectory::new(Arc::clone(&gateway), notifier);
            if !matches!(directory.refresh().await, Some(Ok(_))) {
                std::process::exit(1);
            }
            frontend.show_instance_list();
            print_instances(&directory.instances().await);
        }
        Command::CreateInstance {
            name,
            port,
            install_path,
            min_memory,
            max_memory,
            ip_address,
        } => {
            let directory = InstanceDirectory::new(Arc::clone(&gateway), notifier);
            let spec = CreateInstanceRequest {
                instance_name: name,
                port,
                install_path,
                min_memory,
                max_memory,
                ip_address,
            };
            if !matches!(directory.create(spec).await, Some(Ok(_))) {
                std::process::exit(1);
            }
            print_instances(&directory.instances().await);
        }
        Command::Toggle { id } => {
            let record = gateway.fetch_instance(InstanceId(id)).await?;
            let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel();
            let controller = InstanceLifecycleController::new(
                record,
                Arc::clone(&gateway),
                Arc::clone(&notifier),
                refresh_tx,
            );
            controller.toggle().await;
            println!(
                "{} -> {}",
                id,
                controller.displayed_status().await.as_str()
            );
            if refresh_rx.try_recv().is_ok() {
                let directory = InstanceDirectory::new(Arc::clone(&gateway), notifier);
                if matches!(directory.refresh().await, Some(Ok(_))) {
                    frontend.show_instance_list();
                    print_instances(&directory.instances().await);
                }
            }
        }
        Command::Namespaces { id } => {
            let directory = NamespaceDirectory::new(InstanceId(id), Arc::clone(&gateway), notifier);
            if !matches!(directory.load().await, Some(Ok(_))) {
                std::process::exit(1);
            }
            frontend.show_namespace_view(InstanceId(id));
            for namespace in directory.summaries().await {
                println!("{}", namespace.name);
            }
        }
        Command::CreateNamespace { id, name } => {
            let directory = NamespaceDirectory::new(InstanceId(id), Arc::clone(&gateway), notifier);
            if !matches!(directory.create(&name).await, Some(Ok(_))) {
                std::process::exit(1);
            }
        }
        Command::Query {
            id,
            namespace,
            query,
        } => {
            let console =
                NamespaceQueryConsole::new(InstanceId(id), namespace, Arc::clone(&gateway), notifier);
            console.open().await;
            console.submit_query(&query).await;
            match console.session().await {
                SessionState::DisplayingResults(rows) => print_rows(&rows),
                SessionState::QueryInput | SessionState::Closed => {}
            }
        }
        Command::Upload {
            id,
            namespace,
            file,
        } => {
            let bytes = tokio::fs::read(&file).await?;
            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.ttl".to_string());
            let console =
                NamespaceQueryConsole::new(InstanceId(id), namespace, Arc::clone(&gateway), notifier);
            console.open().await;
            console.stage_file(TtlFile { filename, bytes }).await;
            console.submit_upload().await;
            if console.staged_file().await.is_some() {
                // Upload failed; the file stayed staged for a retry.
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
