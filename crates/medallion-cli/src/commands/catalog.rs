use medallion_engine::gold::CATALOG;

/// Execute the `catalog` command: list the gold result sets.
pub fn execute(with_sql: bool) {
    for query in CATALOG {
        println!("{}", query.name);
        if with_sql {
            println!("{}\n", query.sql.trim());
        }
    }
}
