//! # clubhouse-membership
//!
//! The membership application lifecycle: a guest submits an application, an
//! admin approves or rejects it, a rejected applicant may resubmit.
//!
//! ```text
//! (none) --submit--> PENDING --approve--> APPROVED
//!                    PENDING --reject---> REJECTED
//!                    REJECTED --submit--> PENDING   (same row)
//! ```
//!
//! The service never touches a database directly. It is handed a [`Store`]
//! and runs every operation inside one [`StoreTx`], so approval (role change,
//! member row, status update) commits together or not at all.

pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod store;

pub use error::{MembershipError, StoreError};
pub use lifecycle::MembershipService;
pub use memory::MemoryStore;
pub use store::{
    ApplicationChange, ApplicationFields, ApplicationStore, MemberStore, NewApplication, NewMember,
    Store, StoreResult, StoreTx, UserStore,
};
