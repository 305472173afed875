use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn generate_accounts_csv(path: &Path, accounts: u32, balance: u32) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["account", "balance"])?;

    for account in 1..=accounts {
        wtr.write_record([account.to_string(), balance.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Random transfers between accounts `1..=accounts`, amounts in `0.01..=max_amount`.
pub fn generate_transfers_csv(
    path: &Path,
    accounts: u32,
    rows: usize,
    max_amount: u32,
) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["from", "to", "amount"])?;

    let mut rng = rand::thread_rng();
    for _ in 0..rows {
        let from = rng.gen_range(1..=accounts);
        let to = rng.gen_range(1..=accounts);
        let cents = rng.gen_range(1..=max_amount * 100);
        wtr.write_record([
            from.to_string(),
            to.to_string(),
            format!("{}.{:02}", cents / 100, cents % 100),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
