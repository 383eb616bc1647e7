// Writes a synthetic panorama for trying panovid without a real photo

use std::path::PathBuf;

use clap::Parser;
use image::{Rgb, RgbImage};

#[derive(Parser)]
#[command(name = "synth_panorama", about = "Write a rainbow test panorama")]
struct Args {
    /// Output image path
    #[arg(default_value = "synthetic_panorama.png")]
    output: PathBuf,

    /// Image width in pixels
    #[arg(long, default_value_t = 4000)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 1080)]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("🖼️  Generating {}x{} panorama", args.width, args.height);

    let image = RgbImage::from_fn(args.width, args.height, |x, y| {
        let hue = (x as f32 / args.width.max(1) as f32) * 360.0;
        // Every 100th column is a white marker so the scroll is easy to follow
        if x % 100 < 2 || y % 120 < 2 {
            Rgb([255, 255, 255])
        } else {
            let shade = 0.5 + 0.5 * (y as f32 / args.height.max(1) as f32);
            Rgb(hsv_to_rgb(hue, 0.7, shade))
        }
    });

    image.save(&args.output)?;
    println!("📁 Saved to {}", args.output.display());
    println!("   Try: panovid {} --landscape --portrait", args.output.display());

    Ok(())
}

/// Convert HSV to RGB color
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    [
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    ]
}
