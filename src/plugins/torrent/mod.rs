pub mod cli;
pub mod filename;
pub mod interstitial;
pub mod metainfo;
pub mod resolver;
