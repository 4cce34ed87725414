use std::path::PathBuf;

/// Print the record count and per-embedder breakdown of a persisted index.
///
/// Usage: cargo run -p vaultdb-vector --example status -- [persist_dir] [table]
#[tokio::main]
async fn main() -> vaultdb_core::Result<()> {
    let mut args = std::env::args().skip(1);
    let db_path = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("vault_index"));
    let table = args.next().unwrap_or_else(|| "documents".to_string());

    let total = vaultdb_vector::count_records(&db_path, &table).await?;
    println!("{}: table={} records={}", db_path.display(), table, total);

    let mut by_embedder = std::collections::BTreeMap::<String, usize>::new();
    let mut sources = std::collections::BTreeSet::new();
    for rec in vaultdb_vector::read_records(&db_path, &table).await? {
        *by_embedder.entry(rec.embedder_id).or_default() += 1;
        sources.insert(rec.source_path);
    }
    println!("sources: {}", sources.len());
    for (id, n) in by_embedder { println!("  {id}: {n}"); }
    Ok(())
}
