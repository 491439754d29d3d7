//! Interactive command loop driving one browsing session.
//!
//! Remote failures print as one-line `!` notices and never end the loop,
//! mirroring the transient, dismissible notifications of a visual client.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use shelf_core::browser::Browser;
use shelf_core::client::{StorageApi, UploadSource};
use shelf_core::path;
use shelf_core::preview::media::MediaState;
use shelf_core::preview::{Preview, PreviewDispatcher};

/// How long `open` waits for a video stream to become ready.
const MEDIA_READY_TIMEOUT: Duration = Duration::from_secs(10);

enum Flow {
    Continue,
    Quit,
}

pub async fn run_loop(
    mut browser: Browser,
    previews: PreviewDispatcher,
    api: Arc<dyn StorageApi>,
) -> anyhow::Result<()> {
    use tokio::io::AsyncBufReadExt;

    if let Err(e) = browser.initialize().await {
        notice(&format!("initial listing failed: {e}"));
    } else {
        print_listing(&browser);
    }

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    prompt(&browser)?;
    while let Some(line) = lines.next_line().await? {
        match handle(&mut browser, &previews, &api, line.trim()).await {
            Flow::Continue => prompt(&browser)?,
            Flow::Quit => break,
        }
    }
    Ok(())
}

fn prompt(browser: &Browser) -> anyhow::Result<()> {
    print!("shelf:/{}> ", browser.current_path());
    std::io::stdout().flush()?;
    Ok(())
}

fn notice(message: &str) {
    eprintln!("! {message}");
}

fn print_listing(browser: &Browser) {
    if browser.entries().is_empty() {
        println!("(empty)");
        return;
    }
    for entry in browser.entries() {
        let marker = if entry.is_dir { "d" } else { "-" };
        println!("{marker}  {}", entry.name);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  ls              List the current directory");
    println!("  cd NAME         Enter a folder");
    println!("  up              Go up one level");
    println!("  pwd             Print the current virtual path");
    println!("  refresh         Refetch the current directory");
    println!("  mkdir NAME      Create a folder here");
    println!("  put LOCALPATH   Upload a local file here");
    println!("  get NAME        Print the download URL for an entry");
    println!("  open NAME       Preview a file (image/video/text)");
    println!("  rm NAME         Delete an entry");
    println!("  help            Show this help");
    println!("  quit            Exit");
}

async fn handle(
    browser: &mut Browser,
    previews: &PreviewDispatcher,
    api: &Arc<dyn StorageApi>,
    line: &str,
) -> Flow {
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    match cmd {
        "" => {}
        "help" | "?" => print_help(),
        "quit" | "exit" => return Flow::Quit,
        "ls" => print_listing(browser),
        "pwd" => println!("/{}", browser.current_path()),
        "cd" => {
            if arg.is_empty() {
                notice("usage: cd NAME");
            } else {
                match browser.enter_folder(arg).await {
                    Ok(()) => print_listing(browser),
                    Err(e) => notice(&e.to_string()),
                }
            }
        }
        "up" | ".." => match browser.go_up().await {
            Ok(()) => print_listing(browser),
            Err(e) => notice(&e.to_string()),
        },
        "refresh" => match browser.refresh().await {
            Ok(()) => print_listing(browser),
            Err(e) => notice(&e.to_string()),
        },
        "mkdir" => {
            if arg.is_empty() {
                notice("usage: mkdir NAME");
            } else if let Err(e) = browser.create_folder(arg).await {
                notice(&e.to_string());
            } else {
                print_listing(browser);
            }
        }
        "rm" => {
            if arg.is_empty() {
                notice("usage: rm NAME");
            } else if let Err(e) = browser.delete_entry(arg).await {
                notice(&e.to_string());
            } else {
                print_listing(browser);
            }
        }
        "put" => {
            if arg.is_empty() {
                notice("usage: put LOCALPATH");
            } else {
                let source = UploadSource::LocalFile {
                    path: PathBuf::from(arg),
                };
                match browser.upload(source).await {
                    Ok(()) => print_listing(browser),
                    Err(e) => notice(&e.to_string()),
                }
            }
        }
        "get" => {
            if arg.is_empty() {
                notice("usage: get NAME");
            } else {
                // Stand-in for the external URL launch mechanism.
                let target = path::join(&browser.current_path(), arg);
                match api.download_url(&target) {
                    Ok(url) => println!("{url}"),
                    Err(e) => notice(&e.to_string()),
                }
            }
        }
        "open" | "cat" => {
            if arg.is_empty() {
                notice("usage: open NAME");
            } else {
                open_preview(browser, previews, arg).await;
            }
        }
        other => notice(&format!("unknown command: {other} (try `help`)")),
    }
    Flow::Continue
}

async fn open_preview(browser: &Browser, previews: &PreviewDispatcher, name: &str) {
    match previews.open(&browser.current_path(), name).await {
        Ok(Preview::Image { url }) => println!("image: {url}"),
        Ok(Preview::Text { body }) => print!("{body}"),
        Ok(Preview::Video(mut session)) => {
            let mut state = session.subscribe();
            let outcome = tokio::time::timeout(MEDIA_READY_TIMEOUT, async {
                while *state.borrow() == MediaState::Initializing {
                    if state.changed().await.is_err() {
                        break;
                    }
                }
                *state.borrow()
            })
            .await;
            match outcome {
                Ok(MediaState::Ready) => println!(
                    "video ready: {} (aspect {:.2})",
                    session.source_url(),
                    session.display_aspect_ratio()
                ),
                Ok(_) => notice("video preview failed to open"),
                Err(_) => notice("video preview timed out"),
            }
            session.close();
        }
        Ok(Preview::Unsupported { file_name }) => {
            notice(&format!("no preview for {file_name}"));
        }
        Err(e) => notice(&e.to_string()),
    }
}
