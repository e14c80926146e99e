//! aquamark - Overlay text watermarks onto PDF and image files.

mod cli;

use std::process;

use anyhow::Context;
use clap::Parser;

use crate::cli::Cli;
use aquamark::fonts::FontLibrary;
use aquamark::render::{ImageTarget, OverlayTarget, PdfTarget, RenderContext};
use aquamark::service::{WatermarkBuilder, WatermarkService};
use aquamark::{WatermarkAttributes, WatermarkError};

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        let code = err
            .downcast_ref::<WatermarkError>()
            .map_or(1, WatermarkError::exit_code);
        process::exit(code);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> anyhow::Result<()> {
    cli.validate()?;
    let watermarks = cli.to_watermarks()?;

    let fonts = match &cli.font {
        Some(path) => FontLibrary::from_file(path)
            .with_context(|| format!("loading font {}", path.display()))?,
        None => FontLibrary::discover().context("discovering a system font")?,
    };
    let mut ctx = RenderContext::new(fonts);
    if let Some(jobs) = cli.jobs {
        ctx = ctx.workers(jobs);
    }
    let service = WatermarkService::with_context(ctx);

    let bytes = tokio::fs::read(&cli.input)
        .await
        .with_context(|| format!("reading {}", cli.input.display()))?;

    if !cli.quiet {
        println!("aquamark v{}", aquamark::VERSION);
    }
    if cli.verbose {
        println!(
            "  Read {} bytes from {}",
            bytes.len(),
            cli.input.display()
        );
    }

    if bytes.starts_with(b"%PDF-") {
        if cli.dry_run {
            let pages = PdfTarget::from_bytes(&bytes)?.page_count();
            print_dry_run(&cli, &watermarks, &format!("PDF with {pages} page(s)"));
            return Ok(());
        }

        let builder = configure(service.pdf_bytes(&bytes)?, &watermarks);
        let stamped = builder.apply_to_file(&cli.output).await?;
        if !cli.quiet {
            println!(
                "Watermarked {} page(s) -> {}",
                stamped.page_count(),
                cli.output.display()
            );
        }
    } else {
        if cli.dry_run {
            let target = ImageTarget::from_bytes(&bytes)?;
            let (w, h) = target.dimensions();
            print_dry_run(&cli, &watermarks, &format!("{w}x{h} {:?} image", target.format()));
            return Ok(());
        }

        let builder = configure(service.image_bytes(&bytes)?, &watermarks);
        let stamped = builder.apply_to_file(&cli.output).await?;
        if !cli.quiet {
            let (w, h) = stamped.dimensions();
            println!("Watermarked {w}x{h} image -> {}", cli.output.display());
        }
    }

    Ok(())
}

/// Transfer parsed watermark descriptions onto the fluent builder.
fn configure<T: OverlayTarget>(
    mut builder: WatermarkBuilder<T>,
    watermarks: &[WatermarkAttributes],
) -> WatermarkBuilder<T> {
    for (i, attrs) in watermarks.iter().enumerate() {
        if i > 0 {
            builder = builder.and();
        }
        builder = builder
            .text(&attrs.text)
            .size(attrs.size)
            .color(attrs.color)
            .opacity(attrs.opacity)
            .rotation(attrs.rotation)
            .position(attrs.anchor)
            .margin(attrs.margin);
        if attrs.tiled {
            builder = builder.tiled(attrs.tile_spacing);
        }
        if attrs.trademark {
            builder = builder.trademark();
        }
    }
    builder
}

fn print_dry_run(cli: &Cli, watermarks: &[WatermarkAttributes], input_summary: &str) {
    println!("Dry run completed successfully");
    println!("  Input:  {} ({input_summary})", cli.input.display());
    println!("  Output would be: {}", cli.output.display());
    for attrs in watermarks {
        println!(
            "  Watermark: {:?} at {:?}, size {}, opacity {}, rotation {}",
            attrs.text, attrs.anchor, attrs.size, attrs.opacity, attrs.rotation
        );
        if attrs.tiled {
            println!("    tiled with spacing {}", attrs.tile_spacing);
        }
        if attrs.trademark {
            println!("    trademark glyph enabled");
        }
    }
    println!("  Run without --dry-run to write the watermarked file");
}
