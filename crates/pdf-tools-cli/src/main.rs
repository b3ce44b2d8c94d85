use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pdf_sign::{
    AppState, LayoutRenderer, NormalizedRect, PageRenderer, SignOptions, SignatureDraft, SignatureKind,
    export_signed_pdf, load_document, save_pdf_bytes, signed_output_path,
};
use std::path::{Path, PathBuf};

mod logger;

#[derive(Parser)]
#[command(name = "pdft", about = "PDF signing CLI", version)]
struct Cli {
    /// More log output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stamp signature images onto a PDF
    Sign {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file (default: signed_<input> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON options file (interaction tuning and upload limits)
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON array of placements: {type, data, x, y, width, height, pageNumber}
        #[arg(long, conflicts_with = "image")]
        placements: Option<PathBuf>,

        /// Signature image (PNG or JPEG) for a single placement
        #[arg(long, required_unless_present = "placements")]
        image: Option<PathBuf>,

        /// 1-based page for --image
        #[arg(long, default_value = "1")]
        page: u32,

        /// Left edge as a fraction of page width
        #[arg(long, default_value = "0.4")]
        x: f32,

        /// Top edge as a fraction of page height
        #[arg(long, default_value = "0.8")]
        y: f32,

        /// Width as a fraction of page width
        #[arg(long, default_value = "0.2")]
        width: f32,

        /// Height as a fraction of page height
        #[arg(long, default_value = "0.1")]
        height: f32,
    },

    /// Show page sizes of a PDF
    Pages {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Width pages would be rendered at on screen
        #[arg(long, default_value = "600")]
        render_width: u32,
    },
}

/// MIME type of an image file, from its extension
fn image_mime(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        _ => bail!("Unsupported signature image: {} (expected .png, .jpg or .jpeg)", path.display()),
    }
}

async fn read_options(config: Option<&Path>) -> Result<SignOptions> {
    match config {
        Some(path) => SignOptions::load(path)
            .await
            .with_context(|| format!("Failed to read options from {}", path.display())),
        None => Ok(SignOptions::default()),
    }
}

async fn read_placements(path: &Path) -> Result<Vec<SignatureDraft>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Invalid placements in {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::CliLogger::new(logger::CliLogger::level_for(cli.verbose, cli.quiet)).init()?;

    match cli.command {
        Commands::Sign {
            input,
            output,
            config,
            placements,
            image,
            page,
            x,
            y,
            width,
            height,
        } => {
            let options = read_options(config.as_deref()).await?;
            let document = load_document(&input, &options.limits)
                .await
                .with_context(|| format!("Failed to load {}", input.display()))?;

            let drafts = match (placements, image) {
                (Some(path), _) => read_placements(&path).await?,
                (None, Some(image)) => {
                    let bytes = tokio::fs::read(&image)
                        .await
                        .with_context(|| format!("Failed to read {}", image.display()))?;
                    let data = pdf_sign::creation::uploaded_image(image_mime(&image)?, &bytes, &options.limits)?;
                    vec![SignatureDraft::new(
                        SignatureKind::Uploaded,
                        data,
                        NormalizedRect::new(x, y, width, height),
                        page,
                    )]
                }
                (None, None) => bail!("Either --placements or --image is required"),
            };

            let mut state = AppState::new(options.interaction);
            let ticket = state.begin_load();
            state.document_loaded(ticket, document);
            for (index, draft) in drafts.into_iter().enumerate() {
                state
                    .add_signature(draft)
                    .with_context(|| format!("Placement {} is invalid", index + 1))?;
            }
            if !state.proceed_to_preview() {
                bail!("Nothing to sign");
            }

            let Some(document) = state.document() else {
                bail!("Document is not loaded");
            };
            let signed = export_signed_pdf(document, state.signatures().as_slice()).await?;
            let output = output.unwrap_or_else(|| signed_output_path(&input));
            save_pdf_bytes(&signed.bytes, &output).await?;

            for skipped in &signed.report.skipped {
                log::warn!("Skipped signature {}: {:?}", skipped.id, skipped.reason);
            }
            println!(
                "Placed {} signature(s) ({} skipped) → {}",
                signed.report.placed.len(),
                signed.report.skipped.len(),
                output.display()
            );
        }

        Commands::Pages { input, render_width } => {
            let document = load_document(&input, &SignOptions::default().limits).await?;
            println!("{}: {} page(s)", document.name, document.page_count());
            for page_number in 1..=document.page_count() {
                let rendered = LayoutRenderer.render_page(&document, page_number, render_width)?;
                println!(
                    "  Page {}: {:.1} × {:.1} pt ({} × {} px)",
                    page_number,
                    rendered.page_size.width_pt,
                    rendered.page_size.height_pt,
                    rendered.pixel_width,
                    rendered.pixel_height
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime_from_extension() {
        assert_eq!(image_mime(Path::new("sig.PNG")).unwrap(), "image/png");
        assert_eq!(image_mime(Path::new("sig.jpeg")).unwrap(), "image/jpeg");
        assert!(image_mime(Path::new("sig.gif")).is_err());
        assert!(image_mime(Path::new("sig")).is_err());
    }

    #[test]
    fn test_cli_parses_single_placement() {
        let cli = Cli::try_parse_from(["pdft", "-v", "sign", "-i", "a.pdf", "--image", "s.png", "--page", "2"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Sign { page, x, image, .. } => {
                assert_eq!(page, 2);
                assert_eq!(x, 0.4);
                assert_eq!(image, Some(PathBuf::from("s.png")));
            }
            Commands::Pages { .. } => panic!("expected sign"),
        }
    }

    #[test]
    fn test_cli_requires_a_signature_source() {
        assert!(Cli::try_parse_from(["pdft", "sign", "-i", "a.pdf"]).is_err());
        assert!(
            Cli::try_parse_from(["pdft", "sign", "-i", "a.pdf", "--image", "s.png", "--placements", "p.json"]).is_err()
        );
    }

    #[tokio::test]
    async fn test_placements_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("placements.json");
        tokio::fs::write(
            &path,
            br#"[{"type": "drawn", "data": "data:image/png;base64,AAAA", "x": 0.1, "y": 0.2, "width": 0.3, "height": 0.1, "pageNumber": 2}]"#,
        )
        .await
        .unwrap();

        let drafts = read_placements(&path).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].page_number, 2);
        assert_eq!(drafts[0].kind, SignatureKind::Drawn);
        assert_eq!(drafts[0].rect, NormalizedRect::new(0.1, 0.2, 0.3, 0.1));
    }
}
