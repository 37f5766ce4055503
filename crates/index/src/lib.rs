pub mod carry;
pub mod strict;
