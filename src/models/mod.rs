pub mod article;
pub mod firestore;
pub mod recommendation;

pub use article::Article;
pub use firestore::{FirestoreDocument, FirestoreValue, RunQueryResponseItem};
pub use recommendation::{Recommendation, Strategy};
