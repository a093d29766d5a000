//! Command dispatch

use crate::cli::{Args, Command};
use anyhow::{Context, bail};
use davplay::auth::{AuthManager, Credentials};
use davplay::storage::Notifier;
use davplay::{HttpTransport, LibraryFile, MediaLibrary, Storage, TransportConfig, WebDavStorage};
use futures::StreamExt;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Prints user-facing errors to stderr.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show_error(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}

/// Run the parsed command.
pub async fn start(args: Args) -> anyhow::Result<()> {
    let path = match args.config {
        Some(path) => path,
        None => davplay::config::default_library_file()
            .context("Cannot determine the configuration directory")?,
    };
    let mut libraries = LibraryFile::load(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let auth_manager = AuthManager::new();

    let name = match args.command {
        Command::Add {
            name,
            url,
            account,
            password,
            strict,
        } => {
            let mut library = MediaLibrary::new(&name, url).strict(strict);
            library.base_url()?;
            library.account = account.clone();

            if let (Some(account), Some(password)) = (account, password) {
                let credentials = Credentials::new(account, password);
                if let Err(e) = auth_manager.store(&name, &credentials) {
                    warn!("Password not saved: {}", e);
                }
            }

            libraries.upsert(library);
            libraries.save()?;
            println!("Saved library '{}' to {}", name, path.display());
            return Ok(());
        }
        Command::Remove { name } => {
            if libraries.remove(&name).is_none() {
                bail!("No library named '{}' in {}", name, path.display());
            }
            libraries.save()?;
            if let Err(e) = auth_manager.clear(&name) {
                debug!("No stored password removed for {}: {}", name, e);
            }
            println!("Removed library '{}'", name);
            return Ok(());
        }
        Command::Libraries => {
            for library in &libraries.libraries {
                match library.account.as_deref() {
                    Some(account) => println!("{}\t{}\t{}", library.name, library.url, account),
                    None => println!("{}\t{}", library.name, library.url),
                }
            }
            return Ok(());
        }
        Command::List { ref library, .. }
        | Command::Cat { ref library, .. }
        | Command::PlayUrl { ref library, .. }
        | Command::Test { ref library } => library.clone(),
    };

    let Some(mut library) = libraries.get(&name).cloned() else {
        bail!("No library named '{}' in {}", name, path.display());
    };
    auth_manager.fill(&mut library);

    let transport = if args.verify_tls {
        Arc::new(HttpTransport::new(TransportConfig {
            insecure_skip_verify: false,
            ..TransportConfig::default()
        }))
    } else {
        HttpTransport::shared()
    };
    let storage =
        WebDavStorage::with_transport(library, transport).with_notifier(Arc::new(ConsoleNotifier));

    match args.command {
        Command::List { path, .. } => {
            let directory = match path {
                Some(path) => storage.path_file(&path, true).await?,
                None => storage.get_root_file().await?,
            };
            for file in storage.list(&directory).await? {
                let kind = if file.is_directory() { "d" } else { "-" };
                println!("{} {:>12} {}", kind, file.size(), file.file_name());
            }
        }
        Command::Cat { path, output, .. } => {
            let file = storage.path_file(&path, false).await?;
            let mut stream = storage.fetch(&file).await?;
            let mut writer: Box<dyn tokio::io::AsyncWrite + Unpin + Send> = match &output {
                Some(output) => Box::new(tokio::fs::File::create(output).await?),
                None => Box::new(tokio::io::stdout()),
            };
            let mut written = 0u64;
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                written += chunk.len() as u64;
                writer.write_all(&chunk).await?;
            }
            writer.flush().await?;
            debug!("Wrote {} bytes", written);
        }
        Command::PlayUrl { path, .. } => {
            let file = storage.path_file(&path, false).await?;
            println!("{}", storage.create_play_url(&file).await);
        }
        Command::Test { .. } => {
            if !storage.test().await {
                bail!("Connection test failed");
            }
            println!("OK");
        }
        Command::Add { .. } | Command::Remove { .. } | Command::Libraries => {}
    }

    Ok(())
}
