pub mod quality_cache;
