// Business logic services layer
//
// Pure, reusable logic with no CLI or I/O dependencies.

pub mod matching;
