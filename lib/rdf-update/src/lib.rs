#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod error;
pub mod store;

pub mod model {
    pub use rdf_update_model::*;
}

pub mod acl {
    pub use rdf_update_acl::*;
}

pub mod execution {
    pub use rdf_update_execution::*;
}

pub mod storage {
    pub use rdf_update_storage::*;
}
