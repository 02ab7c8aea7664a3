use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub mod museum;
pub mod report;
pub mod reservation;

/// A booking slot time rendered as `HH:MM` on the wire
///
/// Accepts an optional seconds component when deserializing
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct SlotTime(pub NaiveTime);

impl From<NaiveTime> for SlotTime {
	fn from(time: NaiveTime) -> Self { Self(time) }
}

impl From<SlotTime> for NaiveTime {
	fn from(time: SlotTime) -> Self { time.0 }
}

impl Serialize for SlotTime {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.collect_str(&self.0.format("%H:%M"))
	}
}

impl<'de> Deserialize<'de> for SlotTime {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;

		NaiveTime::parse_from_str(&s, "%H:%M")
			.or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
			.map(Self)
			.map_err(serde::de::Error::custom)
	}
}
