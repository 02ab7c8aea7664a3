//! Reservation code and QR ticket generation

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::Error;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use rand::Rng;

/// Length of a reservation code
pub const RESERVATION_CODE_LENGTH: usize = 8;

/// Alphabet reservation codes are drawn from
pub const RESERVATION_CODE_ALPHABET: &[u8] =
	b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random reservation code
///
/// Codes are short enough to read out over the phone, collisions are caught
/// by the unique index on the reservation table
#[must_use]
pub fn generate_reservation_code() -> String {
	let mut rng = rand::rng();

	(0..RESERVATION_CODE_LENGTH)
		.map(|_| {
			let idx = rng.random_range(0..RESERVATION_CODE_ALPHABET.len());

			RESERVATION_CODE_ALPHABET[idx] as char
		})
		.collect()
}

/// Render a reservation code into a PNG data URL of its QR symbol
///
/// The QR payload is the bare code, scanners feed the decoded text straight
/// into the check-in endpoint
pub fn render_qr_data_url(code: &str) -> Result<String, Error> {
	let qr = QrCode::new(code.as_bytes())?;

	let image = qr
		.render::<Luma<u8>>()
		.quiet_zone(true)
		.module_dimensions(4, 4)
		.build();

	let mut png = Vec::new();
	DynamicImage::ImageLuma8(image)
		.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

	Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}
