use std::sync::Arc;

use actag::{
    decoder::compute_data_bit_locations,
    family::TagFamilyTable,
    sonar::SonarGeometry,
    utils::Quad,
    AcTagDecoder, DecodeTagsConfig,
};
use actag_image::Image;
use argh::FromArgs;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A small 24 bit family, 8 bits apart under every rotation and reflection.
const CODEWORDS: [&str; 4] = [
    "101010111001001001010100",
    "110001111011010111011100",
    "000110010111011010010100",
    "100010101110000010001101",
];

/// Renders AcTags in a synthetic binary sonar frame and decodes them
#[derive(Debug, FromArgs)]
struct Args {
    /// path to a JSON decoding configuration, overriding the other options
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// number of bit errors to correct
    #[argh(option, short = 'b', default = "2")]
    bit_corrections: usize,

    /// number of data bits flipped in every rendered tag
    #[argh(option, short = 'n', default = "1")]
    noise_bits: usize,

    /// seed of the random generator
    #[argh(option, short = 's', default = "0")]
    seed: u64,

    /// minimum range of the sonar, in meters
    #[argh(option, default = "0.5")]
    min_range: f64,

    /// maximum range of the sonar, in meters
    #[argh(option, default = "10.0")]
    max_range: f64,

    /// horizontal aperture of the sonar, in degrees
    #[argh(option, default = "130.0")]
    aperture_deg: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => DecodeTagsConfig::from_family_name("AcTag24h8", 0.13)?
            .with_bit_corrections(args.bit_corrections)?,
    };

    let codewords = CODEWORDS
        .iter()
        .map(|s| s.bytes().map(|b| b - b'0').collect::<Vec<u8>>())
        .collect::<Vec<_>>();
    let table = Arc::new(TagFamilyTable::build(24, &codewords)?);
    let sonar = SonarGeometry::new(args.min_range, args.max_range, args.aperture_deg.to_radians())?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut image = Image::from_size_val([512, 512].into(), 0u8);
    let mut quads = Vec::new();

    // one tag per table entry on an 8 x 4 grid, so every orientation shows up
    for (i, codeword) in table.iter().enumerate() {
        let (row, col) = (30.0 + (i / 8) as f64 * 120.0, 20.0 + (i % 8) as f64 * 62.0);
        let quad = Quad::from([
            [row, col],
            [row, col + 24.0],
            [row + 24.0, col + 24.0],
            [row + 24.0, col],
        ]);

        let mut bits = codeword.to_vec();
        for _ in 0..args.noise_bits {
            let j = rng.random_range(0..bits.len());
            bits[j] ^= 1;
        }

        let locations = compute_data_bit_locations(&quad, &config.family);
        for (p, &bit) in locations.iter().zip(&bits) {
            if let Some((r, c)) = p.in_bounds(image.height(), image.width()) {
                image.set(r, c, bit)?;
            }
        }

        quads.push(quad);
    }

    let decoder = AcTagDecoder::new(config, table, sonar)?;
    let tags = decoder.decode(&image, &quads)?;

    log::info!("decoded {} tags from {} quads", tags.len(), quads.len());

    println!("{}", serde_json::to_string_pretty(&tags)?);

    Ok(())
}
