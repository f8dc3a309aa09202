// Flag Positions (Bit index in F register)
pub const FLAG_Z_POS: u8 = 7; // Zero Flag
pub const FLAG_N_POS: u8 = 6; // Subtract Flag
pub const FLAG_H_POS: u8 = 5; // Half Carry Flag
pub const FLAG_C_POS: u8 = 4; // Carry Flag

// Flag Masks (Bit masks for F register)
pub const FLAG_Z: u8 = 1 << FLAG_Z_POS;
pub const FLAG_N: u8 = 1 << FLAG_N_POS;
pub const FLAG_H: u8 = 1 << FLAG_H_POS;
pub const FLAG_C: u8 = 1 << FLAG_C_POS;
