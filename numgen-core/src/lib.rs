pub mod export;
pub mod frequency;
pub mod generalize;
pub mod mapping;
pub mod partition;
pub mod reader;
pub mod scanner;
pub mod sentinel;
pub mod source;

pub use export::{
    print_summary, read_mapping_json, write_mapping_csv, write_mapping_json, MappingDocument,
    MappingRecord, SCHEMA_VERSION,
};
pub use frequency::{FrequencyCounter, FrequencyEntry, FrequencyTable, RawFrequencies};
pub use generalize::{generalize_attribute, generalize_attributes, AttributeGeneralization};
pub use mapping::{build_mapping, map_partition, BinAssignment, ValueBinMapping};
pub use numgen_common::{AttributeSpec, NumgenError, Result, SentinelPolicy};
pub use partition::{find_bin_endpoints, partition, Bin, Partition};
pub use reader::{open_parquet_file, ColumnInfo, ParquetFileInfo};
pub use scanner::{resolve_paths, scan_directory};
pub use sentinel::{prepare_table, PreparedTable};
pub use source::{is_binnable, FrequencySource, ParquetFrequencySource};
