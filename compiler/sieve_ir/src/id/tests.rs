use super::*;

#[test]
fn test_reserved_ids_have_no_slot() {
    assert_eq!(NodeId::EXIT.slot(), None);
    assert_eq!(NodeId::FINISH.slot(), None);
    assert_eq!(NodeId::FIRST.slot(), Some(0));
    assert_eq!(NodeId::new(7).slot(), Some(6));
}

#[test]
fn test_terminal_ids() {
    assert!(NodeId::EXIT.is_terminal());
    assert!(NodeId::FINISH.is_terminal());
    assert!(!NodeId::FIRST.is_terminal());
}

#[test]
fn test_default_is_exit() {
    assert_eq!(NodeId::default(), NodeId::EXIT);
}

#[test]
fn test_display() {
    assert_eq!(NodeId::new(3).to_string(), "3");
    assert_eq!(NodeId::FINISH.to_string(), "FINISH");
    assert_eq!(format!("{:?}", NodeId::EXIT), "NodeId::EXIT");
    assert_eq!(Gid::new(12).to_string(), "12");
    assert_eq!(ActionId::new(2).to_string(), "#2");
}
