pub mod graph_store;
