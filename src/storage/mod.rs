//! Persistence of resolved datasets. Storage treats the country-name column
//! as already canonical; no name correction happens here.

pub mod insert;
pub mod schema;

pub use insert::{store_covid, store_gdp, store_medals, store_population};
pub use schema::create_schema;
