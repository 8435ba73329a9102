//! concordx-io — Loading comparison tables and GTF annotations, writing results.
//!
//! # Example
//!
//! ```rust,no_run
//! use concordx_config::ColumnsConfig;
//! use concordx_io::{load_feature_table, load_protein_coding_genes};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let columns = ColumnsConfig::default();
//!     let comp1 = load_feature_table("de/treated_vs_ctrl.tsv".as_ref(), "comp1", &columns).await?;
//!     let coding = load_protein_coding_genes("gencode.v44.annotation.gtf".as_ref()).await?;
//!     println!("{} features, {} coding genes", comp1.len(), coding.len());
//!     Ok(())
//! }
//! ```

pub mod table;
pub mod gtf;
pub mod writer;

pub use gtf::{load_protein_coding_genes, parse_protein_coding_genes};
pub use table::{load_feature_table, parse_feature_table};
pub use writer::{write_results, write_results_to_path};
