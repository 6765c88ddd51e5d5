//! Plain text or JSON output.

use serde::Serialize;

#[derive(Serialize)]
struct JsonOut<T: Serialize> {
    ok: bool,
    data: T,
}

pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else if data.is_empty() {
        println!("(none)");
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

pub fn print_one<T: Serialize>(json: bool, data: &T, row: impl Fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", row(data));
    }
    Ok(())
}

/// Dates as `dd/mm/yyyy`, blank when unknown.
pub fn date<D: chrono::Datelike>(value: Option<D>) -> String {
    value.map_or_else(String::new, |d| {
        format!("{:02}/{:02}/{:04}", d.day(), d.month(), d.year())
    })
}
