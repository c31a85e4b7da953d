use clap::Parser;
use quad_hash::ProbeTable;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "capacity", default_value_t = 7)]
    capacity: usize,

    #[arg(short = 'n', long = "keys", default_value_t = 1000)]
    keys: i64,

    /// Gap between consecutive inserted keys.
    #[arg(short = 's', long = "stride", default_value_t = 3)]
    stride: i64,
}

fn main() {
    let args = Args::parse();

    println!("Creating table with requested capacity: {}", args.capacity);

    let mut table = ProbeTable::with_capacity(args.capacity);

    println!("Actual capacity (prime): {}", table.capacity());
    println!(
        "Inserting {} keys with stride {}...",
        args.keys, args.stride
    );

    let mut rejected = 0usize;
    for i in 0..args.keys {
        if table.insert(i.wrapping_mul(args.stride)).is_err() {
            rejected += 1;
        }
    }

    println!("Inserted {} keys into table", table.len());
    println!(
        "Final load factor: {:.2}%",
        table.load_factor() * 100.0
    );

    if table.capacity() <= 64 {
        println!("table: {table}");
    }

    table.stats().print();

    let histogram = table.probe_histogram();
    let last = histogram.iter().rposition(|&count| count > 0).unwrap_or(0);
    println!("probe histogram (distance -> keys):");
    for (distance, count) in histogram.iter().enumerate().take(last + 1) {
        println!("{distance:>3} | {count}");
    }

    println!(
        "Rejected inserts (duplicate or probe limit): {} ({:.02}%)",
        rejected,
        rejected as f64 / args.keys.max(1) as f64 * 100.0
    );
}
