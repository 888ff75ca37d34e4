const DELETED: u8 = 1 << 0;

/// Per-element flags. Deleted elements stay in storage, and keep their
/// handles, until the mesh is garbage collected.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Status {
    flags: u8,
}

impl Status {
    fn check(&self, i: u8) -> bool {
        self.flags & i > 0
    }

    fn set(&mut self, i: u8, flag: bool) {
        if flag {
            self.flags |= i;
        } else {
            self.flags &= !i;
        }
    }

    pub fn deleted(&self) -> bool {
        self.check(DELETED)
    }

    pub fn set_deleted(&mut self, flag: bool) {
        self.set(DELETED, flag);
    }
}

#[cfg(test)]
mod test {
    use super::Status;

    #[test]
    fn t_status_deleted_flag() {
        let mut s = Status::default();
        assert!(!s.deleted());
        s.set_deleted(true);
        assert!(s.deleted());
        s.set_deleted(false);
        assert_eq!(Status::default(), s);
    }
}
