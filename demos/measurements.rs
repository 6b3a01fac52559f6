use std::{env, error::Error, fs::File};

use log::info;
use memmap2::MmapOptions;
use mimalloc::MiMalloc;
use nodict::Table;
use rayon::prelude::*;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_BUCKETS: usize = 8000;

/// Readings in tenths of a degree.
#[derive(Debug, Clone, Copy)]
struct Temperature {
    min: i32,
    max: i32,
    sum: i64,
    count: u32,
}

impl Temperature {
    fn new(temperature: i32) -> Self {
        Self {
            min: temperature,
            max: temperature,
            sum: temperature as i64,
            count: 1,
        }
    }

    fn update(&mut self, other: &Temperature) {
        self.min = i32::min(self.min, other.min);
        self.max = i32::max(self.max, other.max);
        self.sum += other.sum;
        self.count += other.count;
    }

    fn mean(&self) -> f64 {
        self.sum as f64 / self.count as f64
    }
}

type Stations = Table<String, Temperature>;

#[inline]
fn digit(byte: u8) -> Option<i32> {
    byte.is_ascii_digit().then(|| (byte - b'0') as i32)
}

/// Parses `-?d?d.d` into tenths of a degree.
fn parse_temperature(raw: &[u8]) -> Option<i32> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let (negative, raw) = match raw.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, raw),
    };
    let value = match *raw {
        [ones, b'.', fraction] => digit(ones)? * 10 + digit(fraction)?,
        [tens, ones, b'.', fraction] => digit(tens)? * 100 + digit(ones)? * 10 + digit(fraction)?,
        _ => return None,
    };
    Some(if negative { -value } else { value })
}

fn record(stations: &mut Stations, station: &str, reading: Temperature) {
    let merged = match stations.get(station).ok().copied() {
        Some(mut current) => {
            current.update(&reading);
            current
        }
        None => reading,
    };
    stations.add(station.to_owned(), merged);
}

fn aggregate(chunk: &[u8], mut stations: Stations) -> Stations {
    let mut start = 0;
    for end in memchr::memchr_iter(b'\n', chunk).chain(std::iter::once(chunk.len())) {
        let line = &chunk[start..end];
        start = end + 1;
        let Some(split) = memchr::memrchr(b';', line) else {
            continue;
        };
        let (Ok(station), Some(temperature)) = (
            std::str::from_utf8(&line[..split]),
            parse_temperature(&line[split + 1..]),
        ) else {
            continue;
        };
        record(&mut stations, station, Temperature::new(temperature));
    }
    stations
}

/// Splits `data` into roughly `count` pieces, each ending on a newline.
fn split_lines(data: &[u8], count: usize) -> Vec<&[u8]> {
    let count = count.clamp(1, data.len().max(1));
    let target = (data.len() / count).max(1);
    let mut chunks = Vec::with_capacity(count);
    let mut start = 0;
    while start < data.len() {
        let guess = (start + target).min(data.len());
        let end = match memchr::memchr(b'\n', &data[guess..]) {
            Some(offset) => guess + offset + 1,
            None => data.len(),
        };
        chunks.push(&data[start..end]);
        start = end;
    }
    chunks
}

fn format_results(stations: &Stations) -> String {
    let mut results = stations
        .iter()
        .map(|(station, temperature)| {
            format!(
                "{}={:.1}/{:.1}/{:.1}",
                station,
                temperature.min as f64 / 10.0,
                temperature.mean() / 10.0,
                temperature.max as f64 / 10.0
            )
        })
        .collect::<Vec<String>>();
    results.sort_unstable();
    format!("{{{}}}", results.join(", "))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "measurements.txt".to_string());
    let threads = env::var("THREADS").map_or(Ok(rayon::current_num_threads()), |value| {
        value.parse::<usize>()
    })?;
    let buckets = env::var("BUCKETS").map_or(Ok(DEFAULT_BUCKETS), |value| {
        value.parse::<usize>()
    })?;
    let empty = Stations::with_buckets(buckets)?;

    let file = File::open(&path)?;
    let data = unsafe { MmapOptions::new().map(&file)? };
    let chunks = split_lines(&data, threads);
    info!("Aggregating {} bytes in {} chunks", data.len(), chunks.len());

    let partials: Vec<Stations> = chunks
        .into_par_iter()
        .map(|chunk| aggregate(chunk, empty.clone()))
        .collect();

    let mut results = empty;
    for partial in &partials {
        for (station, reading) in partial.iter() {
            record(&mut results, station, *reading);
        }
    }
    info!(
        "{} stations across {} buckets, load factor {:.2}",
        results.len(),
        results.bucket_count(),
        results.load_factor()
    );

    println!("{}", format_results(&results));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stations(buckets: usize) -> Stations {
        Stations::with_buckets(buckets).unwrap()
    }

    #[test]
    fn parse_readings() {
        assert_eq!(parse_temperature(b"8.7"), Some(87));
        assert_eq!(parse_temperature(b"-8.7"), Some(-87));
        assert_eq!(parse_temperature(b"99.9"), Some(999));
        assert_eq!(parse_temperature(b"-0.1"), Some(-1));
        assert_eq!(parse_temperature(b"12.0\r"), Some(120));
    }

    #[test]
    fn reject_malformed_readings() {
        for raw in [
            &b"12"[..],
            b"1.2.3",
            b"1.23",
            b".5",
            b"-",
            b"",
            b"a.1",
            b"--1.0",
            b"99999999999.9",
        ] {
            assert_eq!(parse_temperature(raw), None, "{:?}", raw);
        }
    }

    #[test]
    fn chunks_cover_input_on_line_boundaries() {
        for data in [&b"a;1.0\nbb;2.0\nccc;3.0\n"[..], b"a;1.0\nbb;2.0\nccc;3.0"] {
            for count in [1, 2, 3, 7, usize::MAX] {
                let chunks = split_lines(data, count);
                assert_eq!(chunks.concat(), data);
                for chunk in &chunks[..chunks.len() - 1] {
                    assert_eq!(chunk.last(), Some(&b'\n'));
                }
            }
        }
        assert!(split_lines(b"", 4).is_empty());
    }

    #[test]
    fn aggregate_reads_last_unterminated_line() {
        let result = aggregate(b"Oslo;1.0\nLima;-2.5\nOslo;3.0", stations(8));
        let oslo = result.get("Oslo").unwrap();
        assert_eq!((oslo.min, oslo.max, oslo.count), (10, 30, 2));
        assert_eq!(result.get("Lima").unwrap().sum, -25);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn merge_partials() {
        let first = aggregate(b"Oslo;1.0\nLima;5.0\n", stations(4));
        let second = aggregate(b"Oslo;-3.0\nOslo;2.0\n", stations(4));
        let mut merged = stations(4);
        for partial in [&first, &second] {
            for (station, reading) in partial.iter() {
                record(&mut merged, station, *reading);
            }
        }
        let oslo = merged.get("Oslo").unwrap();
        assert_eq!((oslo.min, oslo.max, oslo.sum, oslo.count), (-30, 20, 0, 3));
        assert_eq!(merged.get("Lima").unwrap().count, 1);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn format_sorted_summary() {
        let result = aggregate(b"b;1.0\na;1.0\na;2.0\n", stations(2));
        assert_eq!(format_results(&result), "{a=1.0/1.5/2.0, b=1.0/1.0/1.0}");
    }
}
