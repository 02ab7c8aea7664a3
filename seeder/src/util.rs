use std::collections::HashSet;
use std::hash::Hash;

use clap::Error;
use clap::error::ErrorKind;
use common::DbConn;
use diesel::PgConnection;

/// Draw from a generator until it has produced `count` distinct items
///
/// The caller must make sure the generator can actually produce that many
pub fn generate_unique_set<T, F>(count: usize, mut f: F) -> Vec<T>
where
	T: Eq + Hash,
	F: FnMut() -> T,
{
	let mut set = HashSet::with_capacity(count);

	while set.len() < count {
		set.insert(f());
	}

	set.into_iter().collect()
}

/// Insert rows chunk by chunk so a single statement stays a sane size
pub async fn batch_insert<T, F>(
	conn: &DbConn,
	mut rows: Vec<T>,
	chunk_size: usize,
	inserter: F,
) -> Result<usize, Error>
where
	T: Send + 'static,
	F: Fn(&mut PgConnection, &[T]) -> Result<usize, diesel::result::Error>
		+ Send
		+ Copy
		+ 'static,
{
	let total = rows.len();
	let mut inserted = 0;

	while !rows.is_empty() {
		let rest = rows.split_off(chunk_size.min(rows.len()));
		let chunk = std::mem::replace(&mut rows, rest);
		let expected = chunk.len();

		let count = conn
			.interact(move |c| inserter(c, &chunk))
			.await
			.map_err(|e| Error::raw(ErrorKind::Io, e))?
			.map_err(|e| Error::raw(ErrorKind::Io, e))?;

		if count != expected {
			return Err(Error::raw(
				ErrorKind::Io,
				format!("inserted {count} rows where {expected} were expected"),
			));
		}

		inserted += count;

		println!("Inserted {inserted}/{total} rows");
	}

	Ok(inserted)
}
