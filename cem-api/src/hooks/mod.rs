pub mod scalar_logging;
