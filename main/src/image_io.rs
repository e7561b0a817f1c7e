//! PNG seeding and dumping of the grid buffer. Pixels are stored as
//! packed `0xRRGGBBAA` `u32`s, matching [`scheduler::grid::Grid`]'s layout.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{bail, Context, Result};

pub fn load_png(path: &str, dim: usize) -> Result<Vec<u32>> {
    let file = File::open(path).with_context(|| format!("opening image {path}"))?;
    let decoder = png::Decoder::new(file);
    let mut reader = decoder.read_info().context("reading PNG header")?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).context("decoding PNG frame")?;

    if info.width as usize != dim || info.height as usize != dim {
        bail!(
            "image {path} is {}x{}, expected {dim}x{dim}",
            info.width,
            info.height
        );
    }

    let channels = info.color_type.samples();
    let bytes = &buf[..info.width as usize * info.height as usize * channels];
    let mut pixels = Vec::with_capacity(dim * dim);
    for chunk in bytes.chunks(channels) {
        let (r, g, b, a) = match channels {
            4 => (chunk[0], chunk[1], chunk[2], chunk[3]),
            3 => (chunk[0], chunk[1], chunk[2], 255),
            1 => (chunk[0], chunk[0], chunk[0], 255),
            n => bail!("unsupported PNG channel count {n}"),
        };
        pixels.push(u32::from_be_bytes([r, g, b, a]));
    }
    Ok(pixels)
}

pub fn dump_png(path: impl AsRef<Path>, pixels: &[u32], dim: usize) -> Result<()> {
    let file = File::create(&path)
        .with_context(|| format!("creating image {}", path.as_ref().display()))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, dim as u32, dim as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().context("writing PNG header")?;

    let mut bytes = Vec::with_capacity(dim * dim * 4);
    for &px in pixels {
        bytes.extend_from_slice(&px.to_be_bytes());
    }
    writer.write_image_data(&bytes).context("writing PNG data")?;
    Ok(())
}
