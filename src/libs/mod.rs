pub mod fasta;
pub mod hamming;
pub mod io;
pub mod phylo;
pub mod place;
