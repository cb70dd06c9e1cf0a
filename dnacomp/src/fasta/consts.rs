use crate::sequence::Acid;

pub(super) const FASTA_TITLE_PREFIX: u8 = b'>';

/// Acid for every byte that denotes one; lowercase is folded to uppercase.
pub(super) const FASTA_BYTE_TO_ACID: [Option<Acid>; 256] = {
    let mut acids = [None; 256];

    acids[b'A' as usize] = Some(Acid::A);
    acids[b'C' as usize] = Some(Acid::C);
    acids[b'G' as usize] = Some(Acid::G);
    acids[b'T' as usize] = Some(Acid::T);
    acids[b'a' as usize] = Some(Acid::A);
    acids[b'c' as usize] = Some(Acid::C);
    acids[b'g' as usize] = Some(Acid::G);
    acids[b't' as usize] = Some(Acid::T);

    acids
};
