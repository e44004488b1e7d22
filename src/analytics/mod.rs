/// Analytics layer: the aggregate catalog, categorical encodings, the
/// correlation matrix and the per-page reports built from them.
///
/// Every function here is pure over a filtered [`crate::data::filter::View`].

pub mod aggregate;
pub mod correlation;
pub mod encoding;
pub mod pages;
