pub mod stat_helpers;
